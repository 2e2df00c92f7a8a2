//! Tiller: Command Dispatch Kernel
//!
//! Registers commands with declarative argument and flag metadata, resolves a
//! command from argv (eagerly registered first, then a lazily loaded
//! manifest), binds parsed input onto a fresh command instance and runs it
//! between lifecycle hooks. Global flags are observed on every invocation.

pub mod binder;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod manifest;
pub mod metadata;
pub mod parser;
pub mod suggest;
pub mod ui;

pub use command::{Command, CommandContext, CommandDefinition, CommandType};
pub use error::{BindError, KernelError};
pub use kernel::Kernel;
