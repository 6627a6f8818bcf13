use std::path::PathBuf;
use std::time::Duration;

use crate::warc::PayloadMode;

/// Per-request timeout used when none is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Input list of capture descriptors
    pub list: PathBuf,
    /// Directory receiving extracted payloads
    pub output: PathBuf,
    /// Descriptors processed concurrently (1 = strictly sequential)
    pub jobs: usize,
    /// Timeout for each ranged request
    pub timeout: Duration,
    /// Reject segments whose size differs from the requested length
    pub strict_length: bool,
    pub payload_mode: PayloadMode,
    /// Serve archive ranges from this local mirror instead of the network
    pub mirror: Option<PathBuf>,
    /// Suppress per-file progress lines on stdout
    pub quiet: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            list: PathBuf::new(),
            output: PathBuf::new(),
            jobs: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_length: true,
            payload_mode: PayloadMode::Block,
            mirror: None,
            quiet: false,
        }
    }
}
