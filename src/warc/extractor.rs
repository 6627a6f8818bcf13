use crate::error::WarcError;

use super::parser::Records;
use super::payload::http_body;
use super::structures::RecordType;

/// What to emit for each response record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadMode {
    /// The record block exactly as archived: status line, headers and body
    #[default]
    Block,
    /// Only the HTTP body, with transfer and content encodings undone
    HttpBody,
}

/// Response payload extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct WarcExtractor {
    mode: PayloadMode,
}

impl WarcExtractor {
    pub fn new(mode: PayloadMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Payloads of every `response` record in `buffer`, in file order.
    ///
    /// Blocks of other record types are dropped as soon as they are read.
    /// The sequence ends after the first error; payloads yielded before it
    /// are complete.
    pub fn payloads<'a>(
        &self,
        buffer: &'a [u8],
    ) -> impl Iterator<Item = Result<Vec<u8>, WarcError>> + use<'a> {
        let mode = self.mode;
        Records::new(buffer).filter_map(move |item| match item {
            Ok(record) if record.record_type == RecordType::Response => {
                Some(match mode {
                    PayloadMode::Block => Ok(record.block),
                    PayloadMode::HttpBody => http_body(&record.block),
                })
            }
            Ok(record) => {
                tracing::trace!(
                    record_type = %record.record_type,
                    bytes = record.block.len(),
                    "skipping record"
                );
                None
            }
            Err(e) => Some(Err(e)),
        })
    }
}
