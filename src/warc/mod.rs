//! WARC record parsing and response extraction.
//!
//! ## Architecture
//!
//! The module is organized into five components:
//!
//! - [`structures`]: record types and parsed records
//! - [`parser`]: walks a segment buffer record by record, inflating gzip
//!   members transparently and within a size limit
//! - [`arc`]: reader for the older ARC layout
//! - [`payload`]: decodes the HTTP message inside a response block
//! - [`extractor`]: high-level API yielding response payloads
//!
//! ## WARC Format Overview
//!
//! A WARC file is a sequence of records. Each record is:
//! 1. A version line (`WARC/1.0` or `WARC/1.1`)
//! 2. Header fields, one `Name: value` per line, ended by an empty line
//! 3. A content block of exactly `Content-Length` bytes
//! 4. Two CRLF pairs separating it from the next record
//!
//! Crawl archives (`.warc.gz`) compress every record as its own gzip
//! member, which is what lets an index point at a single record with an
//! offset and length. Older crawls are stored as `.arc.gz` files laid out
//! the same way; every ARC capture is treated as a `response` record.
//!
//! ## Limitations
//!
//! - No digest verification (`WARC-Block-Digest`, `WARC-Payload-Digest`)
//! - No reassembly of segmented (`continuation`) records

pub mod arc;
pub mod extractor;
pub mod parser;
pub mod payload;
pub mod structures;

pub use extractor::{PayloadMode, WarcExtractor};
pub use parser::Records;
pub use structures::*;
