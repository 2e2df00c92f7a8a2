//! Command-level metadata and its structural validation.

use crate::error::KernelError;
use crate::metadata::{ArgumentDefinition, FlagDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declarative description of a command: name, positional arguments, flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMetadata {
    #[serde(rename = "commandName")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub args: Vec<ArgumentDefinition>,
    #[serde(default)]
    pub flags: Vec<FlagDefinition>,
}

impl CommandMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Append a positional argument. Declaration order is binding order.
    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.args.push(argument);
        self
    }

    pub fn flag(mut self, flag: FlagDefinition) -> Self {
        self.flags.push(flag);
        self
    }

    /// Check the structural invariants a command must satisfy before it can be
    /// registered. `type_name` identifies the command in diagnostics.
    pub fn validate(&self, type_name: &str) -> Result<(), KernelError> {
        if self.name.trim().is_empty() {
            return Err(KernelError::MissingCommandName {
                type_name: type_name.to_string(),
            });
        }

        validate_argument_order(&self.args)?;
        self.validate_flags()
    }

    fn validate_flags(&self) -> Result<(), KernelError> {
        let mut seen = HashSet::new();
        for flag in &self.flags {
            let identities = std::iter::once(flag.name.as_str()).chain(flag.alias.as_deref());
            for identity in identities {
                if !seen.insert(identity) {
                    return Err(KernelError::DuplicateFlag {
                        command: self.name.clone(),
                        flag: identity.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Required arguments first, then optional ones, then at most one spread.
fn validate_argument_order(args: &[ArgumentDefinition]) -> Result<(), KernelError> {
    let mut first_optional: Option<&ArgumentDefinition> = None;
    for (index, arg) in args.iter().enumerate() {
        if arg.is_spread() && index + 1 != args.len() {
            return Err(KernelError::SpreadNotLast {
                argument: arg.name.clone(),
            });
        }

        if arg.required {
            if let Some(optional) = first_optional {
                return Err(KernelError::OptionalBeforeRequired {
                    optional: optional.name.clone(),
                    required: arg.name.clone(),
                });
            }
        } else if first_optional.is_none() {
            first_optional = Some(arg);
        }
    }
    Ok(())
}
