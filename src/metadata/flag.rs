//! Named flag definitions.

use crate::metadata::Value;
use serde::{Deserialize, Serialize};

/// Declared type of a flag; drives parsing and coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagType {
    String,
    Boolean,
    Number,
    Array,
    NumArray,
}

impl FlagType {
    /// Whether a parsed value has the shape this type declares.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FlagType::String, Value::String(_))
                | (FlagType::Boolean, Value::Boolean(_))
                | (FlagType::Number, Value::Number(_))
                | (FlagType::Array, Value::List(_))
                | (FlagType::NumArray, Value::NumList(_))
        )
    }
}

/// One named option of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    pub property_name: String,
    /// Name used on the command line, without leading dashes
    pub name: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: String,
}

impl FlagDefinition {
    /// Create a flag whose exposed name is the dash-cased property name.
    pub fn new(property_name: impl Into<String>, flag_type: FlagType) -> Self {
        let property_name = property_name.into();
        Self {
            name: dash_case(&property_name),
            property_name,
            flag_type,
            alias: None,
            default: None,
            description: String::new(),
        }
    }

    pub fn string(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FlagType::String)
    }

    pub fn boolean(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FlagType::Boolean)
    }

    pub fn number(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FlagType::Number)
    }

    pub fn array(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FlagType::Array)
    }

    pub fn num_array(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FlagType::NumArray)
    }

    /// Override the exposed name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Alternate name; a single character becomes a short flag (`-a`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Convert a camelCase or snake_case property name into dash-case.
///
/// `isAdmin` becomes `is-admin`, `dry_run` becomes `dry-run`.
pub fn dash_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for ch in input.chars() {
        if ch == '_' || ch == ' ' || ch == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_end_matches('-').to_string()
}
