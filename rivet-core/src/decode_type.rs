use crate::{Error, Result, Value, matches_path};
use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypePath, TypeReference};

/// Decodes a declared Rust parameter type into its semantic value type.
///
/// Returns the type descriptor value (a typed null) and whether the parameter accepts nulls.
/// `Option`, `Box`, `Arc`, `Cow` and references are transparent, `Vec<u8>` and `[u8]` are blobs,
/// other vectors and slices are lists.
pub fn decode_type(ty: &Type) -> Result<(Value, bool)> {
    let mut nullable = false;
    let data_type = 'data_type: {
        match ty {
            Type::Reference(TypeReference { elem, .. }) => {
                if let Type::Slice(slice) = elem.as_ref() {
                    break 'data_type decode_list(&slice.elem)?;
                }
                if let Type::Path(TypePath { path, .. }) = elem.as_ref()
                    && path.is_ident("str")
                {
                    break 'data_type Value::Varchar(None);
                }
                return decode_type(elem);
            }
            Type::Paren(paren) => return decode_type(&paren.elem),
            Type::Group(group) => return decode_type(&group.elem),
            Type::Slice(slice) => break 'data_type decode_list(&slice.elem)?,
            Type::Path(TypePath { path, .. }) => {
                if let Some(ident) = path.get_ident() {
                    if ident == "bool" {
                        break 'data_type Value::Boolean(None);
                    } else if ident == "i8" {
                        break 'data_type Value::Int8(None);
                    } else if ident == "i16" {
                        break 'data_type Value::Int16(None);
                    } else if ident == "i32" {
                        break 'data_type Value::Int32(None);
                    } else if ident == "i64" {
                        break 'data_type Value::Int64(None);
                    } else if ident == "u8" {
                        break 'data_type Value::UInt8(None);
                    } else if ident == "u16" {
                        break 'data_type Value::UInt16(None);
                    } else if ident == "u32" {
                        break 'data_type Value::UInt32(None);
                    } else if ident == "u64" {
                        break 'data_type Value::UInt64(None);
                    } else if ident == "f32" {
                        break 'data_type Value::Float32(None);
                    } else if ident == "f64" {
                        break 'data_type Value::Float64(None);
                    } else if ident == "str" {
                        break 'data_type Value::Varchar(None);
                    } else if ident == "Value" {
                        break 'data_type Value::Null;
                    }
                }
                if matches_path(path, &["std", "string", "String"]) {
                    break 'data_type Value::Varchar(None);
                } else if matches_path(path, &["rust_decimal", "Decimal"]) {
                    break 'data_type Value::Decimal(None, 0, 0);
                } else if matches_path(path, &["time", "Time"]) {
                    break 'data_type Value::Time(None);
                } else if matches_path(path, &["time", "Date"]) {
                    break 'data_type Value::Date(None);
                } else if matches_path(path, &["time", "PrimitiveDateTime"]) {
                    break 'data_type Value::Timestamp(None);
                } else if matches_path(path, &["time", "OffsetDateTime"]) {
                    break 'data_type Value::TimestampWithTimezone(None);
                } else if matches_path(path, &["uuid", "Uuid"]) {
                    break 'data_type Value::Uuid(None);
                }
                let is_option = matches_path(path, &["std", "option", "Option"]);
                let is_list = matches_path(path, &["std", "vec", "Vec"]);
                let is_wrapper = is_option
                    || matches_path(path, &["std", "boxed", "Box"])
                    || matches_path(path, &["std", "sync", "Arc"])
                    || matches_path(path, &["std", "rc", "Rc"])
                    || matches_path(path, &["std", "borrow", "Cow"]);
                if is_list || is_wrapper {
                    let nested = first_type_argument(ty)?;
                    if is_list {
                        break 'data_type decode_list(nested)?;
                    }
                    let (value, nested_nullable) = decode_type(nested)?;
                    nullable = is_option || nested_nullable;
                    break 'data_type value;
                }
            }
            _ => {}
        }
        return Err(Error::msg(format!(
            "Unknown parameter type `{}`",
            ty.to_token_stream()
        )));
    };
    Ok((data_type, nullable))
}

fn decode_list(elem: &Type) -> Result<Value> {
    let (inner, _) = decode_type(elem)?;
    Ok(if matches!(inner, Value::UInt8(..)) {
        Value::Blob(None)
    } else {
        Value::List(None, Box::new(inner))
    })
}

/// First type argument of a generic path, lifetimes are skipped (`Cow<'a, str>` yields `str`).
pub(crate) fn first_type_argument(ty: &Type) -> Result<&Type> {
    let Type::Path(TypePath { path, .. }) = ty else {
        return Err(Error::msg(format!(
            "`{}` must be a path type",
            ty.to_token_stream()
        )));
    };
    let arguments = path.segments.last().map(|v| &v.arguments);
    let Some(PathArguments::AngleBracketed(bracketed)) = arguments else {
        return Err(Error::msg(format!(
            "`{}` must have a generic argument",
            ty.to_token_stream()
        )));
    };
    bracketed
        .args
        .iter()
        .find_map(|v| match v {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .ok_or_else(|| {
            Error::msg(format!(
                "`{}` must have a type as generic argument",
                ty.to_token_stream()
            ))
        })
}
