//! Typed values produced by the parser and assigned by the binder.

use crate::error::BindError;
use serde::{Deserialize, Serialize};

/// A parsed argument or flag value.
///
/// Serialized untagged so manifest defaults read as plain JSON literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
    NumList(Vec<f64>),
}

impl Value {
    /// Shape name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "array",
            Value::NumList(_) => "numArray",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::NumList(value)
    }
}

fn mismatch(expected: &'static str, found: &Value) -> BindError {
    BindError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl TryFrom<Value> for String {
    type Error = BindError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = BindError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = BindError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(mismatch("number", &other)),
        }
    }
}

impl TryFrom<Value> for Vec<String> {
    type Error = BindError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl TryFrom<Value> for Vec<f64> {
    type Error = BindError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::NumList(items) => Ok(items),
            // An empty list has no element type in JSON.
            Value::List(items) if items.is_empty() => Ok(Vec::new()),
            other => Err(mismatch("numArray", &other)),
        }
    }
}
