//! Playlog CLI Binary
//!
//! Command-line interface for querying gameplay contexts and events.

use anyhow::Context as _;
use clap::Parser;
use playlog::cli::{Cli, RunContext};
use playlog::config::ConfigLoader;
use playlog::error::ApiError;
use playlog::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Playlog CLI starting");

    match run(&cli) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{}", describe(&e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone(), cli.token.clone())
        .context("Failed to initialize playlog")?;
    Ok(context.execute(&cli.command)?)
}

/// Domain errors keep their stable CLI wording; anything else shows its chain.
fn describe(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ApiError>() {
        Some(api) if e.chain().count() == 1 => playlog::cli::map_error(api),
        _ => format!("{:#}", e),
    }
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load_with_override(&cli.workspace, cli.config.as_deref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }

    config
}
