//! CLI domain: bootstrap parse, kernel wiring, listing and error output.
//! Command dispatch itself belongs to the kernel.

mod builtins;
mod help;
mod output;
mod parse;
mod route;

pub use builtins::{builtin_catalog, builtin_commands, Echo, Greet};
pub use help::render_listing;
pub use output::{exit_code, map_error};
pub use parse::Cli;
pub use route::RunContext;
