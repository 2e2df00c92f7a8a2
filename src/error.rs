//! Error types for the Tiller command dispatch kernel.

use crate::command::CommandDefinition;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Kernel errors raised during registration, resolution and execution
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Missing command name for \"{type_name}\". Define a non-empty command name")]
    MissingCommandName { type_name: String },

    #[error("Optional argument \"{optional}\" must be after the required argument \"{required}\"")]
    OptionalBeforeRequired { optional: String, required: String },

    #[error("Spread argument \"{argument}\" must be the last argument")]
    SpreadNotLast { argument: String },

    #[error("Flag \"{flag}\" is declared more than once by command \"{command}\"")]
    DuplicateFlag { command: String, flag: String },

    #[error("Invalid manifest {path:?}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Unable to load command \"{command_name}\" from \"{command_path}\": {reason}")]
    CommandLoadFailure {
        command_name: String,
        command_path: String,
        reason: String,
    },

    #[error("Command \"{name}\" is not defined")]
    CommandNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Invalid flags for \"{command}\": {message}")]
    InvalidFlag { command: String, message: String },

    #[error("Missing required argument \"{argument_name}\"")]
    MissingArgument {
        argument_name: String,
        command: Arc<CommandDefinition>,
    },

    #[error("Cannot bind \"{property}\" on \"{command}\": {source}")]
    InvalidBinding {
        command: String,
        property: String,
        #[source]
        source: BindError,
    },

    #[error("{phase} {event} hook failed: {source}")]
    HookFailed {
        phase: &'static str,
        event: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Command(anyhow::Error),
}

impl KernelError {
    /// Stable error code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            KernelError::MissingCommandName { .. } => "E_MISSING_COMMAND_NAME",
            KernelError::OptionalBeforeRequired { .. } | KernelError::SpreadNotLast { .. } => {
                "E_INVALID_ARGUMENT_ORDER"
            }
            KernelError::DuplicateFlag { .. } => "E_DUPLICATE_FLAG",
            KernelError::InvalidManifest { .. } => "E_INVALID_MANIFEST",
            KernelError::CommandLoadFailure { .. } => "E_COMMAND_LOAD_FAILURE",
            KernelError::CommandNotFound { .. } => "E_COMMAND_NOT_FOUND",
            KernelError::InvalidFlag { .. } => "E_INVALID_FLAG",
            KernelError::MissingArgument { .. } => "E_MISSING_ARGUMENT",
            KernelError::InvalidBinding { .. } => "E_INVALID_BINDING",
            KernelError::HookFailed { .. } => "E_HOOK_FAILED",
            KernelError::Command(_) => "E_COMMAND_FAILED",
        }
    }
}

/// Conversion failures when a bound value is assigned to a command property
#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown property")]
    UnknownProperty,
}

/// Prompt failures reported at the prompt boundary
#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("{0}")]
    Invalid(String),

    #[error("No answer trapped for prompt \"{0}\"")]
    Untrapped(String),

    #[error("Unexpected answer for prompt \"{0}\"")]
    UnexpectedAnswer(String),

    #[error("Prompt interaction failed: {0}")]
    Interaction(String),
}

/// Setup errors: configuration loading and logging initialization
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for SetupError {
    fn from(err: config::ConfigError) -> Self {
        SetupError::Config(err.to_string())
    }
}
