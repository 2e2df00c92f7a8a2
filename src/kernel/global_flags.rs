//! Global flags: options observed on every invocation, independent of the
//! command being run.

use crate::command::CommandDefinition;
use crate::metadata::{FlagDefinition, FlagType, Value};
use crate::parser::ParsedArgv;
use std::sync::Arc;

pub type GlobalFlagCallback =
    Arc<dyn Fn(&Value, &ParsedArgv, Option<&CommandDefinition>) + Send + Sync>;

/// Options accepted by [`crate::kernel::Kernel::flag`]
#[derive(Debug, Clone)]
pub struct GlobalFlagOptions {
    pub flag_type: FlagType,
    pub alias: Option<String>,
    pub default: Option<Value>,
    pub description: String,
}

impl Default for GlobalFlagOptions {
    fn default() -> Self {
        Self {
            flag_type: FlagType::Boolean,
            alias: None,
            default: None,
            description: String::new(),
        }
    }
}

impl GlobalFlagOptions {
    pub fn of_type(flag_type: FlagType) -> Self {
        Self {
            flag_type,
            ..Self::default()
        }
    }

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

struct GlobalFlag {
    definition: FlagDefinition,
    callback: GlobalFlagCallback,
}

/// Registered global flags, in registration order
#[derive(Default)]
pub struct GlobalFlags {
    flags: Vec<GlobalFlag>,
}

impl GlobalFlags {
    /// Register a flag; a flag with the same name replaces the earlier one.
    pub fn register(&mut self, name: &str, options: GlobalFlagOptions, callback: GlobalFlagCallback) {
        let definition = FlagDefinition {
            property_name: name.to_string(),
            name: name.to_string(),
            flag_type: options.flag_type,
            alias: options.alias,
            default: options.default,
            description: options.description,
        };
        self.flags.retain(|flag| flag.definition.name != name);
        self.flags.push(GlobalFlag {
            definition,
            callback,
        });
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.flags.iter().map(|flag| &flag.definition)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Invoke each flag present in `parsed` whose value matches its declared
    /// type. Declared defaults reach here through the parser.
    pub fn apply(&self, parsed: &ParsedArgv, command: Option<&CommandDefinition>) {
        for flag in &self.flags {
            let name = &flag.definition.name;
            let Some(value) = parsed.flag(name) else {
                continue;
            };
            if !flag.definition.flag_type.accepts(value) {
                tracing::debug!(flag = %name, kind = value.kind(), "global flag shape mismatch, skipped");
                continue;
            }
            tracing::debug!(flag = %name, "applying global flag");
            (flag.callback)(value, parsed, command);
        }
    }
}
