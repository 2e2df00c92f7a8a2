//! Positional argument definitions.

use serde::{Deserialize, Serialize};

/// How a positional argument consumes tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentKind {
    /// Consumes exactly one token
    String,
    /// Consumes every remaining token
    Spread,
}

/// One positional parameter of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinition {
    pub property_name: String,
    /// Name shown in help output and diagnostics
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgumentKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_required() -> bool {
    true
}

impl ArgumentDefinition {
    fn new(property_name: impl Into<String>, kind: ArgumentKind) -> Self {
        let property_name = property_name.into();
        Self {
            name: property_name.clone(),
            property_name,
            kind,
            required: true,
            description: String::new(),
        }
    }

    /// A single-token argument, required unless marked optional.
    pub fn string(property_name: impl Into<String>) -> Self {
        Self::new(property_name, ArgumentKind::String)
    }

    /// A trailing argument collecting all remaining tokens.
    pub fn spread(property_name: impl Into<String>) -> Self {
        Self::new(property_name, ArgumentKind::Spread)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Override the exposed name (defaults to the property name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_spread(&self) -> bool {
        self.kind == ArgumentKind::Spread
    }
}
