use crate::{Context, Result, decode_type::first_type_argument};
use quote::ToTokens;
use std::fmt::{self, Display, Formatter};
use syn::{
    GenericArgument, PathArguments, ReturnType, Type, TypeImplTrait, TypeParamBound, TypePath,
};

/// Declared return type of an accessor method, reduced to the forms the binding compiler
/// can reason about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// `()`, the method returns nothing.
    Unit,
    /// The raw [`ResultSet`](crate::ResultSet).
    ResultSet,
    /// An executable statement (`BoundStatement` or `Statement`).
    Statement,
    /// The driver specific future of a raw result set (`ResultSetFuture`).
    ResultSetFuture,
    /// A generic future wrapper (`Pending<T>`, `BoxFuture<'_, T>`, `impl Future<Output = T>`).
    Future(Box<TypeDescriptor>),
    /// Any other generic path, with its type arguments.
    Generic {
        name: String,
        arguments: Vec<TypeDescriptor>,
    },
    /// A path without generic arguments: a concrete type.
    Named(String),
    /// Anything else (references, tuples, arrays, trait objects), kept as source text.
    Unsupported(String),
}

impl TypeDescriptor {
    /// Parse the Rust syntax of a type.
    ///
    /// ```rust
    /// use rivet_core::TypeDescriptor;
    /// let ty = TypeDescriptor::parse("impl Future<Output = Vec<User>>").unwrap();
    /// assert_eq!(
    ///     ty,
    ///     TypeDescriptor::Future(Box::new(TypeDescriptor::Generic {
    ///         name: "Vec".into(),
    ///         arguments: vec![TypeDescriptor::Named("User".into())],
    ///     }))
    /// );
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let ty = syn::parse_str::<Type>(source)
            .with_context(|| format!("While parsing the type `{}`", source))?;
        Ok(Self::from_type(&ty))
    }

    pub fn from_return_type(ty: &ReturnType) -> Self {
        match ty {
            ReturnType::Default => TypeDescriptor::Unit,
            ReturnType::Type(_, ty) => Self::from_type(ty),
        }
    }

    pub fn from_type(ty: &Type) -> Self {
        match ty {
            Type::Tuple(tuple) if tuple.elems.is_empty() => TypeDescriptor::Unit,
            Type::Paren(paren) => Self::from_type(&paren.elem),
            Type::Group(group) => Self::from_type(&group.elem),
            Type::ImplTrait(TypeImplTrait { bounds, .. }) => bounds
                .iter()
                .find_map(|bound| {
                    let TypeParamBound::Trait(bound) = bound else {
                        return None;
                    };
                    let segment = bound.path.segments.last()?;
                    if segment.ident != "Future" {
                        return None;
                    }
                    let PathArguments::AngleBracketed(bracketed) = &segment.arguments else {
                        return None;
                    };
                    bracketed.args.iter().find_map(|v| match v {
                        GenericArgument::AssocType(assoc) if assoc.ident == "Output" => {
                            Some(Self::from_type(&assoc.ty))
                        }
                        _ => None,
                    })
                })
                .map(|v| TypeDescriptor::Future(v.into()))
                .unwrap_or_else(|| Self::unsupported(ty)),
            Type::Path(TypePath { qself: None, path }) => {
                let Some(segment) = path.segments.last() else {
                    return Self::unsupported(ty);
                };
                let name = segment.ident.to_string();
                match &segment.arguments {
                    PathArguments::None => match name.as_str() {
                        "ResultSet" => TypeDescriptor::ResultSet,
                        "BoundStatement" | "Statement" => TypeDescriptor::Statement,
                        "ResultSetFuture" => TypeDescriptor::ResultSetFuture,
                        _ => TypeDescriptor::Named(name),
                    },
                    PathArguments::AngleBracketed(bracketed) => {
                        if matches!(name.as_str(), "Pending" | "BoxFuture") {
                            return first_type_argument(ty)
                                .map(|v| TypeDescriptor::Future(Self::from_type(v).into()))
                                .unwrap_or_else(|_| Self::unsupported(ty));
                        }
                        let arguments = bracketed
                            .args
                            .iter()
                            .filter_map(|v| match v {
                                GenericArgument::Type(ty) => Some(Self::from_type(ty)),
                                _ => None,
                            })
                            .collect::<Vec<_>>();
                        if arguments.is_empty() {
                            return Self::unsupported(ty);
                        }
                        TypeDescriptor::Generic { name, arguments }
                    }
                    PathArguments::Parenthesized(..) => Self::unsupported(ty),
                }
            }
            _ => Self::unsupported(ty),
        }
    }

    fn unsupported(ty: &Type) -> Self {
        TypeDescriptor::Unsupported(ty.to_token_stream().to_string())
    }

    /// The name of a concrete type, `None` for every other form.
    pub fn concrete_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Unit => f.write_str("()"),
            TypeDescriptor::ResultSet => f.write_str("ResultSet"),
            TypeDescriptor::Statement => f.write_str("BoundStatement"),
            TypeDescriptor::ResultSetFuture => f.write_str("ResultSetFuture"),
            TypeDescriptor::Future(inner) => write!(f, "impl Future<Output = {}>", inner),
            TypeDescriptor::Generic { name, arguments } => {
                write!(f, "{}<", name)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Named(name) => f.write_str(name),
            TypeDescriptor::Unsupported(source) => f.write_str(source),
        }
    }
}
