use crate::{BoundStatement, Codec, Result, Value};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// The bind variable slot a parameter writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// Every slot with this name.
    Name(String),
    /// The slot at this position (from 0).
    Index(usize),
}

/// Copies one method argument into its slot of the outgoing statement.
#[derive(Clone)]
pub struct ParameterBinder {
    target: BindTarget,
    ty: Value,
    codec: Option<Arc<dyn Codec>>,
}

impl ParameterBinder {
    pub fn new(target: BindTarget, ty: Value, codec: Option<Arc<dyn Codec>>) -> Self {
        Self { target, ty, codec }
    }
    pub fn target(&self) -> &BindTarget {
        &self.target
    }
    pub fn ty(&self) -> &Value {
        &self.ty
    }
    pub fn codec(&self) -> Option<&dyn Codec> {
        self.codec.as_deref()
    }

    /// Nulls go through unchanged, the statement decides how to store them.
    pub fn bind(&self, statement: &mut BoundStatement, value: Value) -> Result<()> {
        match (&self.target, &self.codec) {
            (BindTarget::Name(name), None) => statement.bind_name(name, value, &self.ty)?,
            (BindTarget::Name(name), Some(codec)) => {
                statement.bind_name_with(name, value, codec.as_ref())?
            }
            (BindTarget::Index(index), None) => statement.bind_index(*index, value, &self.ty)?,
            (BindTarget::Index(index), Some(codec)) => {
                statement.bind_index_with(*index, value, codec.as_ref())?
            }
        };
        Ok(())
    }
}

impl Debug for ParameterBinder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("target", &self.target)
            .field("ty", &self.ty)
            .field("codec", &self.codec.as_ref().map(|v| v.name()))
            .finish()
    }
}
