//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `autopager` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use autopager::initialization::init_logger_with;
use autopager::{run_autoload, Opt, RunRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = opt.to_config().context("Invalid configuration")?;

    match run_autoload(config, RunRequest::from(&opt)).await {
        Ok(report) => {
            let total = report
                .total_pages
                .map(|total| total.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "{} Merged {} page{} ({} images) up to page {} of {} in {:.1}s",
                if report.completed { "✅" } else { "⏹" },
                report.pages_merged,
                if report.pages_merged == 1 { "" } else { "s" },
                report.images_appended,
                report.last_page,
                total,
                report.elapsed_seconds
            );
            if report.failures > 0 {
                println!("{} page loads failed - see the log for details", report.failures);
            }
            println!("Stitched document saved in {}", report.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("autopager error: {:#}", e);
            process::exit(1);
        }
    }
}
