//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `qr_trap` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Exit status
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use qr_trap::initialization::init_logger_with;
use qr_trap::{run_batch, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.into(), opt.log_format)
        .context("Failed to initialize logger")?;

    if opt.inputs.is_empty() && opt.file.is_none() {
        eprintln!("qr_trap: nothing to assess (pass inputs or --file PATH, `-` for stdin)");
        process::exit(2);
    }

    match run_batch(opt).await {
        Ok(report) => {
            // Non-zero when nothing could be understood at all
            if report.total > 0 && report.invalid == report.total {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("qr_trap error: {:#}", e);
            process::exit(1);
        }
    }
}
