//! Metadata domain contracts.
//!
//! Declarative descriptions of command arguments and flags, plus the typed
//! values the parser and binder pass around. Pure data, no dispatch behavior.

pub mod argument;
pub mod command;
pub mod flag;
pub mod value;

pub use argument::{ArgumentDefinition, ArgumentKind};
pub use command::CommandMetadata;
pub use flag::{dash_case, FlagDefinition, FlagType};
pub use value::Value;
