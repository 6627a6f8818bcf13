//! Error types for warcrange.
//!
//! Each stage of the per-descriptor pipeline has its own error enum so the
//! caller can tell a bad HTTP status apart from a corrupt archive segment:
//!
//! - [`FetchError`]: the ranged retrieval failed (status, transport, length)
//! - [`WarcError`]: the segment buffer could not be parsed as WARC or ARC records
//! - [`Error`]: umbrella type for one descriptor, adding filesystem failures

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single ranged retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with anything other than 206 Partial Content.
    #[error("Failed to download the WARC segment, status code: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("local mirror read failed for {path}: {source}")]
    Mirror {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive URL has no usable path: {0}")]
    InvalidUrl(String),

    /// A zero-length range cannot be expressed as an inclusive `Range` header.
    #[error("requested range is empty")]
    EmptyRange,

    #[error("range {offset}+{length} overflows a 64-bit offset")]
    RangeOverflow { offset: u64, length: u64 },

    #[error("segment length mismatch: expected {expected} bytes, got {received}")]
    LengthMismatch { expected: u64, received: u64 },
}

/// Failure while walking the records of a segment buffer.
#[derive(Debug, Error)]
pub enum WarcError {
    /// Reported by the WARC reader: bad version line, header or block framing.
    #[error("malformed WARC record: {0}")]
    Malformed(String),

    #[error("malformed ARC record header: {0:?}")]
    MalformedArc(String),

    #[error("truncated ARC record: needed {expected} bytes, {available} available")]
    Truncated { expected: u64, available: u64 },

    #[error("segment could not be decompressed: {0}")]
    Decompress(#[source] std::io::Error),

    /// The segment inflated past the size allowed for its compressed length.
    #[error("inflated segment exceeds {limit} bytes")]
    InflateLimit { limit: u64 },

    #[error("HTTP payload: {0}")]
    HttpPayload(String),
}

/// Failure attributed to one descriptor.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Warc(#[from] WarcError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task failed: {0}")]
    Join(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
