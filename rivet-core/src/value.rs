use crate::{Error, Result};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::{
    any,
    fmt::{self, Display, Formatter},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moving between method arguments, bound statements and result rows.
///
/// Every typed variant wraps an `Option`: the `None` form is both the typed null and the
/// description of the type itself, which is how parameter and bind variable types are carried.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>, /* prec: */ u8, /* scale: */ u8),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    List(Option<Vec<Value>>, /* type: */ Box<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l, l_prec, l_scale), Self::Decimal(r, r_prec, r_scale)) => {
                l == r && l_prec == r_prec && l_scale == r_scale
            }
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::List(l, ..), Self::List(r, ..)) => l == r && self.same_type(other),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Decimal(.., l_prec, l_scale), Self::Decimal(.., r_prec, r_scale)) => {
                l_prec == r_prec && l_scale == r_scale
            }
            (Self::List(.., l), Self::List(.., r)) => l.same_type(r),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    /// True for `Value::Null` and for every typed null.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v, ..) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::List(v, ..) => v.is_none(),
        }
    }

    /// The typed null of the same type (the type descriptor of this value).
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(.., prec, scale) => Value::Decimal(None, *prec, *scale),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::List(.., ty) => Value::List(None, ty.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int8(..) => "TINYINT",
            Value::Int16(..) => "SMALLINT",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::UInt8(..) => "UTINYINT",
            Value::UInt16(..) => "USMALLINT",
            Value::UInt32(..) => "UINTEGER",
            Value::UInt64(..) => "UBIGINT",
            Value::Float32(..) => "FLOAT",
            Value::Float64(..) => "DOUBLE",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::TimestampWithTimezone(..) => "TIMESTAMP WITH TIME ZONE",
            Value::Uuid(..) => "UUID",
            Value::List(..) => "LIST",
        }
    }

    /// Converts this value into the type described by `ty`.
    ///
    /// `Value::Null` as target accepts anything. Nulls become the typed null of `ty`. Integers
    /// change width when the value fits, and widen into floats and decimals. Every other pair
    /// of different types is an error.
    pub fn cast_to(self, ty: &Value) -> Result<Value> {
        if matches!(ty, Value::Null) {
            return Ok(self);
        }
        if self.is_null() {
            return Ok(ty.as_null());
        }
        if self.same_type(ty) {
            return Ok(self);
        }
        // Precision 0 leaves the decimal unconstrained
        if let Value::Decimal(_, prec, scale) = ty
            && let Value::Decimal(Some(v), ..) = self
        {
            return Ok(if *prec == 0 {
                self
            } else {
                Value::Decimal(Some(v.round_dp(*scale as u32)), *prec, *scale)
            });
        }
        let error = |value: &Value| {
            Error::msg(format!(
                "Cannot convert value {} of type {} into {}",
                value,
                value.type_name(),
                ty.type_name()
            ))
        };
        if let Value::List(Some(items), ..) = &self
            && let Value::List(.., inner) = ty
        {
            return Ok(Value::List(
                Some(
                    items
                        .iter()
                        .cloned()
                        .map(|v| v.cast_to(inner))
                        .collect::<Result<_>>()?,
                ),
                inner.clone(),
            ));
        }
        let Some(integer) = self.as_i128() else {
            return match (&self, ty) {
                (Value::Float32(Some(v)), Value::Float64(..)) => Ok(Value::Float64(Some(*v as _))),
                _ => Err(error(&self)),
            };
        };
        macro_rules! narrow {
            ($variant:path, $target:ty) => {
                <$target>::try_from(integer)
                    .map(|v| $variant(Some(v)))
                    .map_err(|_| {
                        Error::msg(format!(
                            "Value {} is out of range for {}",
                            integer,
                            any::type_name::<$target>()
                        ))
                    })
            };
        }
        match ty {
            Value::Boolean(..) => Err(error(&self)),
            Value::Int8(..) => narrow!(Value::Int8, i8),
            Value::Int16(..) => narrow!(Value::Int16, i16),
            Value::Int32(..) => narrow!(Value::Int32, i32),
            Value::Int64(..) => narrow!(Value::Int64, i64),
            Value::UInt8(..) => narrow!(Value::UInt8, u8),
            Value::UInt16(..) => narrow!(Value::UInt16, u16),
            Value::UInt32(..) => narrow!(Value::UInt32, u32),
            Value::UInt64(..) => narrow!(Value::UInt64, u64),
            Value::Float32(..) => Ok(Value::Float32(Some(integer as _))),
            Value::Float64(..) => Ok(Value::Float64(Some(integer as _))),
            Value::Decimal(.., prec, scale) => Decimal::from_i128(integer)
                .map(|v| Value::Decimal(Some(v), *prec, *scale))
                .ok_or_else(|| error(&self)),
            _ => Err(error(&self)),
        }
    }

    fn as_i128(&self) -> Option<i128> {
        Some(match self {
            Value::Int8(Some(v)) => *v as _,
            Value::Int16(Some(v)) => *v as _,
            Value::Int32(Some(v)) => *v as _,
            Value::Int64(Some(v)) => *v as _,
            Value::UInt8(Some(v)) => *v as _,
            Value::UInt16(Some(v)) => *v as _,
            Value::UInt32(Some(v)) => *v as _,
            Value::UInt64(Some(v)) => *v as _,
            _ => return None,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{v}"),
            Value::Int8(Some(v)) => write!(f, "{v}"),
            Value::Int16(Some(v)) => write!(f, "{v}"),
            Value::Int32(Some(v)) => write!(f, "{v}"),
            Value::Int64(Some(v)) => write!(f, "{v}"),
            Value::UInt8(Some(v)) => write!(f, "{v}"),
            Value::UInt16(Some(v)) => write!(f, "{v}"),
            Value::UInt32(Some(v)) => write!(f, "{v}"),
            Value::UInt64(Some(v)) => write!(f, "{v}"),
            Value::Float32(Some(v)) => write!(f, "{v}"),
            Value::Float64(Some(v)) => write!(f, "{v}"),
            Value::Decimal(Some(v), ..) => write!(f, "{v}"),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Blob(Some(v)) => {
                f.write_str("'")?;
                for b in v.iter() {
                    write!(f, "\\x{:02X}", b)?;
                }
                f.write_str("'")
            }
            Value::Date(Some(v)) => write!(f, "'{v}'"),
            Value::Time(Some(v)) => write!(f, "'{v}'"),
            Value::Timestamp(Some(v)) => write!(f, "'{v}'"),
            Value::TimestampWithTimezone(Some(v)) => write!(f, "'{v}'"),
            Value::Uuid(Some(v)) => write!(f, "'{v}'"),
            Value::List(Some(v), ..) => {
                f.write_str("[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            _ => f.write_str("NULL"),
        }
    }
}
