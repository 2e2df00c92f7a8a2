//! CLI parse: clap types for the bootstrap options. Everything after them is
//! forwarded to the kernel untouched.

use clap::Parser;
use std::path::PathBuf;

/// Tiller - command dispatch kernel
#[derive(Debug, Parser)]
#[command(name = "tiller")]
#[command(about = "Dispatch registered and manifest-backed commands")]
pub struct Cli {
    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Command name followed by its arguments and flags
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}
