use crate::{Error, Result, Value};
use std::{collections::HashMap, sync::Arc};

/// Explicit serializer for a single argument, overriding the implicit conversion driven by
/// the parameter type.
pub trait Codec: Send + Sync {
    /// Name the codec is registered and referenced with.
    fn name(&self) -> &str;
    /// Turn the argument into the value stored in the statement.
    fn encode(&self, value: Value) -> Result<Value>;
}

/// Renders any scalar argument as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn name(&self) -> &str {
        "text"
    }
    fn encode(&self, value: Value) -> Result<Value> {
        Ok(match value {
            v if v.is_null() => Value::Varchar(None),
            Value::Varchar(v) => Value::Varchar(v),
            Value::List(..) | Value::Blob(..) => {
                return Err(Error::msg(format!(
                    "The text codec cannot encode a value of type {}",
                    value.type_name()
                )));
            }
            // Display quotes these, the codec keeps the bare text
            Value::Date(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::Time(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::Timestamp(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::TimestampWithTimezone(Some(v)) => Value::Varchar(Some(v.to_string())),
            Value::Uuid(Some(v)) => Value::Varchar(Some(v.to_string())),
            v => Value::Varchar(Some(v.to_string())),
        })
    }
}

/// Timestamps as milliseconds since the unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpochMillisCodec;

impl Codec for EpochMillisCodec {
    fn name(&self) -> &str {
        "epoch_millis"
    }
    fn encode(&self, value: Value) -> Result<Value> {
        let nanos = match value {
            v if v.is_null() => return Ok(Value::Int64(None)),
            Value::Timestamp(Some(v)) => v.assume_utc().unix_timestamp_nanos(),
            Value::TimestampWithTimezone(Some(v)) => v.unix_timestamp_nanos(),
            v => {
                return Err(Error::msg(format!(
                    "The epoch_millis codec cannot encode a value of type {}",
                    v.type_name()
                )));
            }
        };
        let millis = i64::try_from(nanos / 1_000_000).map_err(|_| {
            Error::msg(format!(
                "Timestamp of {} nanoseconds is out of range for epoch_millis",
                nanos
            ))
        })?;
        Ok(Value::Int64(Some(millis)))
    }
}

/// Codecs available to parameter overrides, by name.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// A registry without any codec.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }
    pub fn register(&mut self, codec: impl Codec + 'static) -> &mut Self {
        self.codecs.insert(codec.name().to_owned(), Arc::new(codec));
        self
    }
    pub fn codec(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.codecs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::msg(format!("No codec registered with the name `{}`", name)))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }
}

/// The built-in codecs: `text` and `epoch_millis`.
impl Default for CodecRegistry {
    fn default() -> Self {
        let mut result = Self::empty();
        result.register(TextCodec).register(EpochMillisCodec);
        result
    }
}
