//! Binder: validates parsed input against a command's metadata and assigns the
//! typed values onto the command instance.
//!
//! Bindings are planned first and assigned afterwards, so a missing required
//! argument leaves the instance untouched.

use crate::command::{Command, CommandDefinition};
use crate::error::KernelError;
use crate::metadata::{ArgumentKind, FlagType, Value};
use crate::parser::{is_truthy, ParsedArgv};
use std::sync::Arc;

/// One property assignment produced by [`plan`]
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub property: String,
    pub value: Value,
}

/// Compute every assignment for `definition` from `parsed`.
pub fn plan(
    definition: &Arc<CommandDefinition>,
    parsed: &ParsedArgv,
) -> Result<Vec<Binding>, KernelError> {
    let metadata = definition.metadata();
    let mut bindings = Vec::with_capacity(metadata.args.len() + metadata.flags.len());
    let mut tokens = parsed.positionals.iter();

    for arg in &metadata.args {
        let value = match arg.kind {
            ArgumentKind::String => tokens.next().cloned().map(Value::String),
            ArgumentKind::Spread => {
                let rest: Vec<String> = tokens.by_ref().cloned().collect();
                (!rest.is_empty()).then_some(Value::List(rest))
            }
        };

        match value {
            Some(value) => bindings.push(Binding {
                property: arg.property_name.clone(),
                value,
            }),
            None if arg.required => {
                return Err(KernelError::MissingArgument {
                    argument_name: arg.name.clone(),
                    command: Arc::clone(definition),
                });
            }
            None => {}
        }
    }

    for flag in &metadata.flags {
        let value = parsed
            .flag(&flag.name)
            .cloned()
            .or_else(|| flag.default.clone());
        if let Some(value) = value {
            bindings.push(Binding {
                property: flag.property_name.clone(),
                value: coerce(flag.flag_type, value),
            });
        }
    }

    Ok(bindings)
}

/// Assign planned bindings onto a command instance.
pub fn apply(
    definition: &CommandDefinition,
    bindings: Vec<Binding>,
    instance: &mut dyn Command,
) -> Result<(), KernelError> {
    for binding in bindings {
        instance
            .set(&binding.property, binding.value)
            .map_err(|source| KernelError::InvalidBinding {
                command: definition.name().to_string(),
                property: binding.property.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Normalize declared defaults to the flag type. Parsed values already carry
/// the right shape.
fn coerce(flag_type: FlagType, value: Value) -> Value {
    match (flag_type, value) {
        (FlagType::Boolean, Value::String(raw)) => Value::Boolean(is_truthy(&raw)),
        (FlagType::Boolean, Value::Number(n)) => Value::Boolean(n != 0.0),
        (FlagType::Number, Value::String(raw)) => match raw.trim().parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(raw),
        },
        (FlagType::Array, Value::String(raw)) => Value::List(vec![raw]),
        (FlagType::NumArray, Value::Number(n)) => Value::NumList(vec![n]),
        (FlagType::NumArray, Value::List(items)) if items.is_empty() => Value::NumList(Vec::new()),
        (_, value) => value,
    }
}
