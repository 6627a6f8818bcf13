//! ARC v1 record reader.
//!
//! An ARC record is a single header line followed by a block:
//!
//! ```text
//! <url> <ip-address> <archive-date> <content-type> <length>\n
//! <length bytes: the HTTP response as captured>\n
//! ```
//!
//! Version 2 headers carry more fields, but the URL always comes first and
//! the block length always comes last.

use std::io::{BufRead, Read};
use std::iter::FusedIterator;

use crate::error::WarcError;

use super::structures::Record;

/// Minimum number of fields in an ARC header line
const MIN_HEADER_FIELDS: usize = 5;

/// Iterator over the records of an ARC stream.
pub struct ArcReader<R> {
    reader: R,
    failed: bool,
}

impl<R: BufRead> ArcReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            failed: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>, WarcError> {
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut line)
                .map_err(WarcError::Decompress)?;
            if read == 0 {
                return Ok(None);
            }
            // Blank separator between records
            if !line.iter().all(|b| matches!(b, b'\r' | b'\n')) {
                break;
            }
        }

        let text = String::from_utf8_lossy(&line);
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < MIN_HEADER_FIELDS {
            return Err(WarcError::MalformedArc(text.trim().to_string()));
        }
        let url = fields[0];
        let length: u64 = fields[fields.len() - 1]
            .parse()
            .map_err(|_| WarcError::MalformedArc(text.trim().to_string()))?;

        let mut block = Vec::new();
        (&mut self.reader)
            .take(length)
            .read_to_end(&mut block)
            .map_err(WarcError::Decompress)?;
        if (block.len() as u64) < length {
            return Err(WarcError::Truncated {
                expected: length,
                available: block.len() as u64,
            });
        }

        Ok(Some(Record::from_arc(url, block)))
    }
}

impl<R: BufRead> Iterator for ArcReader<R> {
    type Item = Result<Record, WarcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.read_record().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

impl<R: BufRead> FusedIterator for ArcReader<R> {}
