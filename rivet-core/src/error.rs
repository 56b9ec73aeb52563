use std::fmt::{self, Display, Formatter};

/// A declaration that can never be invoked correctly, detected while compiling a binding.
///
/// Carried inside [`Error`](crate::Error), use `error.downcast_ref::<ConfigurationError>()` to tell it apart
/// from the runtime failures of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    /// Name of the offending accessor method.
    pub method: String,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            message: message.into(),
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigurationError {}
