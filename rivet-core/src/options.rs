use crate::{BoundStatement, Context, Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    str::FromStr,
};
use url::Url;
use urlencoding::decode;

/// Replication consistency requested for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

impl Consistency {
    pub const fn name(&self) -> &'static str {
        match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Two => "TWO",
            Consistency::Three => "THREE",
            Consistency::Quorum => "QUORUM",
            Consistency::All => "ALL",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::Serial => "SERIAL",
            Consistency::LocalSerial => "LOCAL_SERIAL",
            Consistency::LocalOne => "LOCAL_ONE",
        }
    }
}

impl FromStr for Consistency {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "ANY" => Consistency::Any,
            "ONE" => Consistency::One,
            "TWO" => Consistency::Two,
            "THREE" => Consistency::Three,
            "QUORUM" => Consistency::Quorum,
            "ALL" => Consistency::All,
            "LOCAL_QUORUM" => Consistency::LocalQuorum,
            "EACH_QUORUM" => Consistency::EachQuorum,
            "SERIAL" => Consistency::Serial,
            "LOCAL_SERIAL" => Consistency::LocalSerial,
            "LOCAL_ONE" => Consistency::LocalOne,
            _ => return Err(Error::msg(format!("Unknown consistency level `{}`", s))),
        })
    }
}

impl Display for Consistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per method execution overrides. Every field left unset keeps the session default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub consistency: Option<Consistency>,
    pub fetch_size: Option<NonZeroU32>,
    pub tracing: Option<bool>,
    pub idempotent: Option<bool>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }
    /// Zero means unset.
    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = NonZeroU32::new(fetch_size);
        self
    }
    pub fn tracing(mut self, tracing: bool) -> Self {
        self.tracing = Some(tracing);
        self
    }
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = Some(idempotent);
        self
    }

    /// Field by field fallback: values set on `self` win.
    pub fn or(self, fallback: ExecutionOptions) -> Self {
        Self {
            consistency: self.consistency.or(fallback.consistency),
            fetch_size: self.fetch_size.or(fallback.fetch_size),
            tracing: self.tracing.or(fallback.tracing),
            idempotent: self.idempotent.or(fallback.idempotent),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, statement: &mut BoundStatement) {
        if let Some(consistency) = self.consistency {
            statement.set_consistency(consistency);
        }
        if let Some(fetch_size) = self.fetch_size {
            statement.set_fetch_size(fetch_size.get());
        }
        if self.tracing == Some(true) {
            statement.enable_tracing();
        }
        if let Some(idempotent) = self.idempotent {
            statement.set_idempotent(idempotent);
        }
    }

    /// Read the options from the query string of a url.
    ///
    /// ```rust
    /// use rivet_core::{Consistency, ExecutionOptions};
    /// let options = ExecutionOptions::from_url("rivet://?consistency=local_quorum&fetch_size=500").unwrap();
    /// assert_eq!(options.consistency, Some(Consistency::LocalQuorum));
    /// assert_eq!(options.fetch_size.map(|v| v.get()), Some(500));
    /// assert_eq!(options.tracing, None);
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While reading the execution options from `{}`", url);
        let decoded = decode(url).with_context(context)?;
        let url = Url::parse(&decoded).with_context(context)?;
        let mut result = Self::default();
        for (key, value) in url.query_pairs() {
            match &*key {
                "consistency" => {
                    result.consistency = Some(value.parse().with_context(context)?);
                }
                "fetch_size" => {
                    let fetch_size = value
                        .parse::<u32>()
                        .map_err(|e| Error::msg(format!("Invalid fetch_size `{}`: {}", value, e)))
                        .with_context(context)?;
                    result.fetch_size = NonZeroU32::new(fetch_size);
                }
                "tracing" => result.tracing = Some(parse_flag(&value).with_context(context)?),
                "idempotent" => {
                    result.idempotent = Some(parse_flag(&value).with_context(context)?)
                }
                _ => {
                    let error =
                        Error::msg(format!("Unknown execution option `{}`", key)).context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        }
        Ok(result)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value {
        "" | "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::msg(format!("Invalid boolean flag `{}`", value))),
    }
}
