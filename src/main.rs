//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `pages_domain_check` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! Exits with status 1 when any host is misconfigured or the run fails.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use pages_domain_check::initialization::init_logger_with;
use pages_domain_check::{render_plain, run_checks, Cli, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let output = config.output.clone();
    match run_checks(config).await {
        Ok(summary) => {
            match output {
                OutputFormat::Plain => print!("{}", render_plain(&summary)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialize results")?
                ),
            }
            if summary.invalid > 0 {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("pages_domain_check error: {:#}", e);
            process::exit(1);
        }
    }
}
