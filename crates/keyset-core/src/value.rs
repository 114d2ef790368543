//! Field values and declared field types.
//!
//! Every value that takes part in a keyset position (the unique id of the
//! last row, and the sort-field value when a custom sort is active) has to
//! survive a round trip through the continuation token. [`Value::to_token_string`]
//! produces the canonical string form and [`FieldKind::parse_token_value`]
//! is its exact inverse for the declared type of the field.

use std::cmp::Ordering;
use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, IntoStaticStr};
use thiserror::Error;
use uuid::Uuid;

/// Declared type of an entity field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    IntoStaticStr
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FieldKind {
    /// `true` or `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit floating point number.
    Float,
    /// UTF-8 string.
    String,
    /// UUID, typically a time-ordered v7 identifier.
    Uuid,
    /// Instant in time with nanosecond precision.
    Timestamp,
}

/// Error returned when a string cannot be parsed as a value of a [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{input}' as {kind}")]
pub struct ValueParseError {
    /// The declared kind.
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
}

impl FieldKind {
    /// Parses the canonical token form of a value of this kind.
    pub fn parse_token_value(self, raw: &str) -> Result<Value, ValueParseError> {
        let error = || ValueParseError {
            kind: self.into(),
            input: raw.to_owned(),
        };

        let value = match self {
            Self::Bool => Value::Bool(raw.parse().map_err(|_| error())?),
            Self::Int => Value::Int(raw.parse().map_err(|_| error())?),
            Self::Float => {
                let float: f64 = raw.parse().map_err(|_| error())?;
                if float.is_nan() {
                    return Err(error());
                }
                Value::Float(float)
            }
            Self::String => Value::String(raw.to_owned()),
            Self::Uuid => Value::Uuid(Uuid::parse_str(raw).map_err(|_| error())?),
            Self::Timestamp => {
                let nanos: i128 = raw.parse().map_err(|_| error())?;
                Value::Timestamp(Timestamp::from_nanosecond(nanos).map_err(|_| error())?)
            }
        };

        Ok(value)
    }

    /// Converts a JSON value into a value of this kind.
    ///
    /// JSON `null` and missing fields become [`Value::Null`]. Timestamps are
    /// accepted either as RFC 3339 strings or as integer epoch milliseconds.
    /// Returns `None` when the JSON value does not fit the declared kind.
    pub fn from_json(self, json: Option<&serde_json::Value>) -> Option<Value> {
        use serde_json::Value as Json;

        let json = match json {
            None | Some(Json::Null) => return Some(Value::Null),
            Some(json) => json,
        };

        match (self, json) {
            (Self::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
            (Self::Int, Json::Number(n)) => n.as_i64().map(Value::Int),
            (Self::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
            (Self::String, Json::String(s)) => Some(Value::String(s.clone())),
            (Self::Uuid, Json::String(s)) => Uuid::parse_str(s).ok().map(Value::Uuid),
            (Self::Timestamp, Json::String(s)) => s.parse::<Timestamp>().ok().map(Value::Timestamp),
            (Self::Timestamp, Json::Number(n)) => n
                .as_i64()
                .and_then(|ms| Timestamp::from_millisecond(ms).ok())
                .map(Value::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A single field value read from an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent or explicitly null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// UUID value.
    Uuid(Uuid),
    /// Timestamp value.
    Timestamp(Timestamp),
}

impl Value {
    /// Returns the kind of this value, or `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(FieldKind::Bool),
            Self::Int(_) => Some(FieldKind::Int),
            Self::Float(_) => Some(FieldKind::Float),
            Self::String(_) => Some(FieldKind::String),
            Self::Uuid(_) => Some(FieldKind::Uuid),
            Self::Timestamp(_) => Some(FieldKind::Timestamp),
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the canonical string form used inside continuation tokens.
    ///
    /// Timestamps are written as integer epoch nanoseconds so that they
    /// round-trip without loss. Returns `None` for values that cannot take
    /// part in a keyset position (null and NaN).
    pub fn to_token_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.is_nan() => None,
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Uuid(u) => Some(u.hyphenated().to_string()),
            Self::Timestamp(ts) => Some(ts.as_nanosecond().to_string()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
