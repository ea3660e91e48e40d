//! Creation timestamps, precise or approximate.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{TypeError, TypeResult};

/// Creation time of a metadata record or an event.
///
/// Precise timestamps serialize as `CREATED`. Approximate ones, such as
/// `"2000~"` or `"1990/1995"`, are kept verbatim and serialize as
/// `fi:CREATED`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Created {
    Precise(DateTime<Utc>),
    Approximate(String),
}

impl Created {
    pub fn precise(at: DateTime<Utc>) -> Self {
        Self::Precise(at)
    }

    /// An approximate date given as free text.
    pub fn approximate(value: impl Into<String>) -> TypeResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::EmptyValue { field: "created" });
        }
        Ok(Self::Approximate(value))
    }

    /// Parse an RFC 3339 timestamp, falling back to an approximate value.
    pub fn parse(value: &str) -> TypeResult<Self> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(at) => Ok(Self::Precise(at.with_timezone(&Utc))),
            Err(_) => Self::approximate(value),
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Self::Approximate(_))
    }

    /// The attribute value written to the document.
    pub fn value(&self) -> String {
        match self {
            Self::Precise(at) => format_timestamp(at),
            Self::Approximate(value) => value.clone(),
        }
    }
}

impl From<DateTime<Utc>> for Created {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Precise(at)
    }
}

impl fmt::Display for Created {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}

/// ISO 8601 with second precision and an explicit offset.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}
