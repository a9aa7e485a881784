//! Cell value types for catalog-agnostic data transfer.
//!
//! Values are fully owned: datasets in this engine are transient whole-table
//! materializations held in memory for the duration of a single migration,
//! so there is no source buffer to borrow from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell value in a dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Missing value.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer.
    Int(i64),

    /// 64-bit floating point.
    Float(f64),

    /// Text/string data.
    Text(String),

    /// Timestamp in UTC. Columns of this type can serve as incremental
    /// migration watermarks.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Logical type name of this value, used for per-column type checks.
    pub fn data_type(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Extract a timestamp if this value holds one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(Value::Null.data_type(), "null");
        assert_eq!(Value::Int(7).data_type(), "integer");
        assert_eq!(Value::Text("x".into()).data_type(), "text");
        assert_eq!(Value::Timestamp(Utc::now()).data_type(), "timestamp");
    }

    #[test]
    fn test_as_timestamp() {
        let now = Utc::now();
        assert_eq!(Value::Timestamp(now).as_timestamp(), Some(now));
        assert_eq!(Value::Int(1).as_timestamp(), None);
    }
}
