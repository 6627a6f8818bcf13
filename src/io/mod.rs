mod http;
mod local;

pub use http::HttpRangeFetcher;
pub use local::LocalMirrorFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait for retrieving one byte range of a remote archive file
#[async_trait]
pub trait FetchRange: Send + Sync {
    /// Fetch `[offset, offset + length)` of the archive at `url` into memory
    async fn fetch_range(&self, url: &str, offset: u64, length: u64) -> Result<Vec<u8>, FetchError>;
}

/// Inclusive end of a `length`-byte range starting at `offset`.
///
/// Rejects empty and overflowing ranges before any I/O is attempted.
pub fn inclusive_end(offset: u64, length: u64) -> Result<u64, FetchError> {
    if length == 0 {
        return Err(FetchError::EmptyRange);
    }
    offset
        .checked_add(length - 1)
        .ok_or(FetchError::RangeOverflow { offset, length })
}

/// Compare a received buffer against the requested length.
///
/// With `strict` unset the buffer is accepted as-is.
pub fn check_length(expected: u64, received: usize, strict: bool) -> Result<(), FetchError> {
    let received = received as u64;
    if strict && received != expected {
        return Err(FetchError::LengthMismatch { expected, received });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_end_of_range() {
        assert_eq!(inclusive_end(100, 50).unwrap(), 149);
        assert_eq!(inclusive_end(0, 1).unwrap(), 0);
    }

    #[test]
    fn empty_and_overflowing_ranges_are_rejected() {
        assert!(matches!(inclusive_end(10, 0), Err(FetchError::EmptyRange)));
        assert!(matches!(
            inclusive_end(u64::MAX, 2),
            Err(FetchError::RangeOverflow { .. })
        ));
        assert_eq!(inclusive_end(u64::MAX, 1).unwrap(), u64::MAX);
    }

    #[test]
    fn length_check_respects_strictness() {
        assert!(check_length(10, 10, true).is_ok());
        assert!(matches!(
            check_length(10, 4, true),
            Err(FetchError::LengthMismatch { expected: 10, received: 4 })
        ));
        assert!(check_length(10, 4, false).is_ok());
    }
}
