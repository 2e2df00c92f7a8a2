//! Tiller CLI Binary
//!
//! Bootstraps configuration and logging, then hands the remaining tokens to
//! the kernel.

use clap::Parser;
use std::process;
use tiller::cli::{exit_code, map_error, Cli, RunContext};
use tiller::config::TillerConfig;
use tiller::logging::{init_logging, LoggingConfig};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match RunContext::load_config(&cli.workspace, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &config);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    debug!(workspace = %cli.workspace.display(), "tiller starting");

    let context = match RunContext::new(cli.workspace.clone(), &config).await {
        Ok(context) => context,
        Err(e) => {
            error!(code = e.code(), "Error initializing kernel: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(exit_code(&e));
        }
    };

    match context.execute(&cli.argv).await {
        Ok(Some(listing)) => println!("{}", listing),
        Ok(None) => {}
        Err(e) => {
            error!(code = e.code(), "Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(exit_code(&e));
        }
    }
}

/// Build logging configuration from CLI args on top of the loaded config.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, config: &TillerConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }

    logging
}
