use crate::{Context, Result, TypeDescriptor, Value, decode_type};
use syn::{FnArg, Pat, PatType, Signature};

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Semantic value type, `Value::Null` accepts any value as is.
    pub ty: Value,
    pub nullable: bool,
}

/// Signature of an accessor method: what the binding compiler works from.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    return_type: TypeDescriptor,
    variadic: bool,
}

impl MethodDescriptor {
    /// A method without parameters returning `()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeDescriptor::Unit,
            variadic: false,
        }
    }

    /// Parse a Rust function signature.
    ///
    /// `async fn` wraps the return type in a future and a trailing `...` makes the method
    /// variadic. Receivers are ignored.
    /// ```rust
    /// use rivet_core::{MethodDescriptor, TypeDescriptor, Value};
    /// let method = MethodDescriptor::parse("fn find_user(&self, id: i32) -> User").unwrap();
    /// assert_eq!(method.name(), "find_user");
    /// assert_eq!(method.parameters()[0].ty, Value::Int32(None));
    /// assert_eq!(method.return_type(), &TypeDescriptor::Named("User".into()));
    /// ```
    pub fn parse(signature: &str) -> Result<Self> {
        let context = || format!("While parsing the method signature `{}`", signature);
        let signature = syn::parse_str::<Signature>(signature).with_context(context)?;
        Self::from_signature(&signature).with_context(context)
    }

    pub fn from_signature(signature: &Signature) -> Result<Self> {
        let name = signature.ident.to_string();
        let parameters = signature
            .inputs
            .iter()
            .filter_map(|v| match v {
                FnArg::Typed(v) => Some(v),
                FnArg::Receiver(..) => None,
            })
            .enumerate()
            .map(|(i, PatType { pat, ty, .. })| {
                let name = match pat.as_ref() {
                    Pat::Ident(v) => v.ident.to_string(),
                    _ => format!("arg{}", i),
                };
                let (ty, nullable) =
                    decode_type(ty).with_context(|| format!("While decoding parameter `{}`", name))?;
                Ok(ParameterDescriptor { name, ty, nullable })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut return_type = TypeDescriptor::from_return_type(&signature.output);
        if signature.asyncness.is_some() {
            return_type = TypeDescriptor::Future(return_type.into());
        }
        Ok(Self {
            name,
            parameters,
            return_type,
            variadic: signature.variadic.is_some(),
        })
    }

    pub fn parameter(mut self, name: impl Into<String>, ty: Value) -> Self {
        self.parameters.push(ParameterDescriptor {
            name: name.into(),
            ty,
            nullable: false,
        });
        self
    }
    pub fn returns(mut self, return_type: TypeDescriptor) -> Self {
        self.return_type = return_type;
        self
    }
    pub fn variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
}

/// How one parameter addresses the bind variables, and which codec encodes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Bind variable name, the parameter position is used when `None`.
    pub name: Option<String>,
    /// Name of a registered codec overriding the implicit conversion.
    pub codec: Option<String>,
}

impl ParameterSpec {
    pub fn positional() -> Self {
        Default::default()
    }
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            codec: None,
        }
    }
    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }
}
