//! Command contract: the trait commands implement and the registrable definition
//! that pairs static metadata with a factory.

use crate::error::BindError;
use crate::metadata::{CommandMetadata, Value};
use crate::ui::{Logger, Prompt};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A unit of work dispatched by the kernel.
///
/// The kernel creates a fresh instance per invocation, assigns every bound
/// argument and flag through [`Command::set`], then awaits [`Command::handle`].
#[async_trait]
pub trait Command: Send + Sync {
    /// Assign a bound value to the property named by the argument or flag
    /// definition (`property_name`).
    fn set(&mut self, property: &str, value: Value) -> Result<(), BindError>;

    /// Run the command.
    async fn handle(&mut self) -> anyhow::Result<()>;
}

/// Commands that describe themselves statically and can be built from a context.
pub trait CommandType: Command + Sized + 'static {
    fn metadata() -> CommandMetadata;

    fn create(context: CommandContext) -> Self;
}

/// Capabilities handed to a command when it is instantiated
#[derive(Clone)]
pub struct CommandContext {
    /// Raw display mode: no styling, log lines are collected for inspection
    pub raw: bool,
    pub logger: Logger,
    pub prompt: Prompt,
}

type Factory = Arc<dyn Fn(CommandContext) -> Box<dyn Command> + Send + Sync>;

/// A registrable command: metadata plus the factory that instantiates it
pub struct CommandDefinition {
    type_name: String,
    metadata: CommandMetadata,
    factory: Factory,
}

impl CommandDefinition {
    /// Build a definition from a [`CommandType`].
    pub fn of<T: CommandType>() -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            metadata: T::metadata(),
            factory: Arc::new(|context| -> Box<dyn Command> { Box::new(T::create(context)) }),
        }
    }

    /// Build a definition from explicit metadata and a factory closure.
    pub fn from_factory<F>(type_name: impl Into<String>, metadata: CommandMetadata, factory: F) -> Self
    where
        F: Fn(CommandContext) -> Box<dyn Command> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            metadata,
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    pub fn instantiate(&self, context: CommandContext) -> Box<dyn Command> {
        (self.factory)(context)
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("type_name", &self.type_name)
            .field("name", &self.metadata.name)
            .finish_non_exhaustive()
    }
}
