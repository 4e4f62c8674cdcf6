//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `mirrorlist_resolver` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use mirrorlist_resolver::initialization::init_logger_with;
use mirrorlist_resolver::{run_batch, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_batch(config).await {
        Ok(report) => {
            // Responses go to stdout, so the summary goes to stderr
            eprintln!(
                "Answered {} request{} ({} ok, {} not found, {} bad) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.successful,
                report.not_found,
                report.bad_requests,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("mirrorlist_resolver error: {:#}", e);
            process::exit(1);
        }
    }
}
