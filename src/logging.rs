//! Logging init: structured `tracing` output on stderr.
//!
//! Stdout is reserved for the per-file progress lines, so diagnostics never
//! interleave with them when stdout is piped.

use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` takes precedence over `level`, which sets
/// the filter for this crate only.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,warcrange={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
