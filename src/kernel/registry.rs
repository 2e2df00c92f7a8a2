//! Command registry: eagerly registered definitions keyed by name, with an
//! alias index.

use crate::command::CommandDefinition;
use crate::error::KernelError;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<CommandDefinition>>,
    aliases: BTreeMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a definition. A later registration under the same
    /// name replaces the earlier one.
    pub fn register(&mut self, definition: CommandDefinition) -> Result<(), KernelError> {
        definition.metadata().validate(definition.type_name())?;

        let name = definition.name().to_string();
        if let Some(previous) = self.commands.get(&name) {
            tracing::debug!(command = %name, previous = %previous.type_name(), "replacing registered command");
            self.aliases.retain(|_, target| *target != name);
        }
        for alias in &definition.metadata().aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }
        self.commands.insert(name, Arc::new(definition));
        Ok(())
    }

    /// Look up by name, then by alias.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandDefinition>> {
        self.commands.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|target| self.commands.get(target))
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<CommandDefinition>> {
        self.commands.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
