//! Main entry point for the warcrange CLI application.
//!
//! Reads a list of capture descriptors, fetches each record's byte range
//! and writes every extracted response to the output directory.

use anyhow::Result;
use clap::Parser;

use warcrange::Cli;
use warcrange::logging::init_logging;
use warcrange::pipeline;

/// Application entry point.
///
/// Setup failures (unreadable list, uncreatable output directory) end the
/// process with an error. Failures of individual entries are reported and
/// do not affect the exit status.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config = cli.to_config();
    let summary = pipeline::run(&config).await?;

    if !config.quiet {
        eprintln!("\n{summary} ({} fetched)", human_bytes(summary.bytes_fetched));
    }

    Ok(())
}

/// Segment bytes fetched over the run, in binary units.
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}
