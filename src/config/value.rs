//! Typed configuration values and coercion from raw text.
//!
//! Raw values are coerced by the first matching rule:
//! 1. Quoted with a matching `"` or `'` pair: the inner text, verbatim
//! 2. ASCII digits only: an integer
//! 3. Contains a comma: a list of the raw comma-separated pieces
//! 4. `yes` / `no`: a boolean
//! 5. Anything else: the raw string

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// A coerced configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    List(Vec<String>),
    /// Produced when the raw value is missing or could not be coerced.
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(true) => write!(f, "yes"),
            Value::Boolean(false) => write!(f, "no"),
            Value::List(items) => write!(f, "{}", items.join(",")),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Why a raw value fell back to [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("no value given")]
    Missing,

    #[error("integer out of range: {0}")]
    IntegerOverflow(String),
}

/// Coerce a raw value. Never fails: anything that cannot be coerced becomes `Null`.
pub fn coerce(raw: Option<&str>) -> Value {
    match try_coerce(raw) {
        Ok(value) => value,
        Err(err) => {
            debug!(raw = ?raw, error = %err, "Value coerced to null");
            Value::Null
        }
    }
}

/// Coerce a raw value, reporting why it could not be typed.
pub fn try_coerce(raw: Option<&str>) -> Result<Value, CoercionError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(CoercionError::Missing),
    };

    if let Some(inner) = unquote(raw) {
        return Ok(Value::String(inner.to_string()));
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| CoercionError::IntegerOverflow(raw.to_string()));
    }

    if raw.contains(',') {
        return Ok(Value::List(raw.split(',').map(str::to_string).collect()));
    }

    Ok(match raw {
        "yes" => Value::Boolean(true),
        "no" => Value::Boolean(false),
        other => Value::String(other.to_string()),
    })
}

/// Strip a matching pair of surrounding quotes.
fn unquote(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if first == last && (first == b'"' || first == b'\'') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}
