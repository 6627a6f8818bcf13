//! Record iteration over a fetched segment.
//!
//! A segment is either plain records or a run of gzip members, one record
//! per member in crawl archives. Gzip segments are read through a
//! multi-member decoder, so records are framed on the inflated stream and
//! never need to line up with member boundaries.
//!
//! ## Parsing Strategy
//!
//! 1. Inflate lazily, capped at a size derived from the compressed length
//! 2. Skip CR/LF padding and look at the first bytes: `WARC/` selects the
//!    WARC reader, anything else is read as ARC
//! 3. Yield one record at a time; blocks of records the caller drops are
//!    released before the next one is read
//!
//! WARC framing (version line, header fields, `Content-Length` block) is
//! handled by [`rust_warc::WarcReader`].

use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;
use std::sync::{Arc, OnceLock};

use flate2::bufread::MultiGzDecoder;
use rust_warc::WarcReader;

use crate::error::WarcError;

use super::arc::ArcReader;
use super::structures::*;

/// Inflated bytes allowed per fetched byte.
pub const INFLATE_RATIO: u64 = 100;

/// Lower bound on the inflate limit, so small segments holding a single
/// well-compressed page still fit.
pub const MIN_INFLATE_LIMIT: u64 = 4 * 1024 * 1024;

/// Inflate limit for a segment of `compressed` bytes
pub fn inflate_limit(compressed: usize) -> u64 {
    (compressed as u64)
        .saturating_mul(INFLATE_RATIO)
        .max(MIN_INFLATE_LIMIT)
}

/// Why the inflated stream stopped
#[derive(Debug)]
enum Fault {
    Limit,
    Io { kind: io::ErrorKind, message: String },
}

type SharedFault = Arc<OnceLock<Fault>>;

/// Reader over the inflated segment that refuses to go past `limit` bytes.
///
/// Failures are remembered in `fault` so they survive being wrapped by the
/// record readers.
struct Bounded<'a> {
    inner: Box<dyn Read + Send + 'a>,
    count: u64,
    limit: u64,
    fault: SharedFault,
}

impl Read for Bounded<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.count > self.limit {
            return Err(io::Error::other("inflate limit exceeded"));
        }
        // One byte past the limit is enough to tell an exact fit from overflow.
        let room = (self.limit - self.count).saturating_add(1);
        let max = buf.len().min(usize::try_from(room).unwrap_or(usize::MAX));

        let read = match self.inner.read(&mut buf[..max]) {
            Ok(read) => read,
            Err(e) => {
                let _ = self.fault.set(Fault::Io {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.count += read as u64;
        if self.count > self.limit {
            let _ = self.fault.set(Fault::Limit);
            return Err(io::Error::other("inflate limit exceeded"));
        }
        Ok(read)
    }
}

type Inflated<'a> = BufReader<Bounded<'a>>;

enum State<'a> {
    Warc(WarcReader<Inflated<'a>>),
    Arc(ArcReader<Inflated<'a>>),
    /// Failed before the first record
    Pending(Option<WarcError>),
    Done,
}

/// Iterator over the records of a segment buffer.
///
/// Yields `Err` at most once: after the first error the iterator is
/// exhausted, so records read before the error are kept by the caller.
///
/// ## Example
///
/// ```ignore
/// for record in Records::new(&buffer) {
///     let record = record?;
///     println!("{} {} bytes", record.record_type, record.block.len());
/// }
/// ```
pub struct Records<'a> {
    state: State<'a>,
    limit: u64,
    fault: SharedFault,
}

impl<'a> Records<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limit(buffer, inflate_limit(buffer.len()))
    }

    /// Like `new`, with an explicit cap on the inflated size.
    pub fn with_limit(buffer: &'a [u8], limit: u64) -> Self {
        let fault = SharedFault::default();
        let source: Box<dyn Read + Send + 'a> = if buffer.starts_with(GZIP_MAGIC) {
            Box::new(MultiGzDecoder::new(buffer))
        } else {
            Box::new(buffer)
        };
        let mut reader = BufReader::new(Bounded {
            inner: source,
            count: 0,
            limit,
            fault: Arc::clone(&fault),
        });

        let mut records = Self {
            state: State::Done,
            limit,
            fault,
        };
        records.state = match detect_format(&mut reader) {
            Ok(Some(RecordFormat::Warc)) => State::Warc(WarcReader::new(reader)),
            Ok(Some(RecordFormat::Arc)) => State::Arc(ArcReader::new(reader)),
            Ok(None) => State::Done,
            Err(e) => {
                let error = records.fault_error().unwrap_or(WarcError::Decompress(e));
                State::Pending(Some(error))
            }
        };
        tracing::trace!(
            segment = buffer.len(),
            limit,
            format = ?records.format(),
            "opened segment"
        );
        records
    }

    /// Layout of the segment, `None` when it holds no records.
    pub fn format(&self) -> Option<RecordFormat> {
        match self.state {
            State::Warc(_) => Some(RecordFormat::Warc),
            State::Arc(_) => Some(RecordFormat::Arc),
            State::Pending(_) | State::Done => None,
        }
    }

    /// Error recorded below the record readers, which takes precedence
    /// over how they reported it.
    fn fault_error(&self) -> Option<WarcError> {
        match self.fault.get()? {
            Fault::Limit => Some(WarcError::InflateLimit { limit: self.limit }),
            Fault::Io { kind, message } => {
                Some(WarcError::Decompress(io::Error::new(*kind, message.clone())))
            }
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Record, WarcError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match &mut self.state {
            State::Warc(reader) => reader.next().map(|result| {
                result
                    .map(Record::from_warc)
                    .map_err(|e| WarcError::Malformed(format!("{e:?}")))
            }),
            State::Arc(reader) => reader.next(),
            State::Pending(error) => error.take().map(Err),
            State::Done => return None,
        };

        match item {
            Some(Ok(record)) => Some(Ok(record)),
            Some(Err(e)) => {
                let error = self.fault_error().unwrap_or(e);
                self.state = State::Done;
                Some(Err(error))
            }
            None => {
                self.state = State::Done;
                // A reader that took a failed read for end of input
                self.fault_error().map(Err)
            }
        }
    }
}

impl FusedIterator for Records<'_> {}

/// Skip CR/LF padding and tell the layout from the first bytes.
fn detect_format<R: BufRead>(reader: &mut R) -> io::Result<Option<RecordFormat>> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(None);
        }
        let padding = available
            .iter()
            .take_while(|b| matches!(b, b'\r' | b'\n'))
            .count();
        if padding == 0 {
            return Ok(Some(if available.starts_with(WARC_PREFIX) {
                RecordFormat::Warc
            } else {
                RecordFormat::Arc
            }));
        }
        reader.consume(padding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn record(kind: &str, block: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "WARC/1.0\r\nWARC-Type: {kind}\r\nWARC-Target-URI: http://ex.com/\r\nContent-Length: {}\r\n\r\n",
            block.len()
        )
        .into_bytes();
        out.extend_from_slice(block);
        out.extend_from_slice(b"\r\n\r\n");
        out
    }

    fn arc_record(url: &str, block: &[u8]) -> Vec<u8> {
        let mut out =
            format!("{url} 1.2.3.4 20080101000000 text/html {}\n", block.len()).into_bytes();
        out.extend_from_slice(block);
        out.push(b'\n');
        out
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn parses_uncompressed_sequence() {
        let mut buf = record("request", b"GET / HTTP/1.1\r\n\r\n");
        buf.extend(record("response", b"HTTP/1.1 200 OK\r\n\r\nhello"));

        let records: Vec<_> = Records::new(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, RecordType::Request);
        assert_eq!(records[1].record_type, RecordType::Response);
        assert_eq!(records[1].block, b"HTTP/1.1 200 OK\r\n\r\nhello");
        assert_eq!(records[1].target_uri.as_deref(), Some("http://ex.com/"));
    }

    #[test]
    fn parses_gzip_members() {
        let mut buf = gzip(&record("warcinfo", b"software: test\r\n"));
        buf.extend(gzip(&record("response", b"payload")));

        let records: Vec<_> = Records::new(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, RecordType::WarcInfo);
        assert_eq!(records[1].block, b"payload");
    }

    #[test]
    fn gzip_arc_record_is_a_response() {
        let http = b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n<p>old</p>";
        let buf = gzip(&arc_record("http://ex.com/a.html", http));

        let mut records = Records::new(&buf);
        assert_eq!(records.format(), Some(RecordFormat::Arc));
        let record = records.next().unwrap().unwrap();
        assert_eq!(record.record_type, RecordType::Response);
        assert_eq!(record.block, http);
        assert!(records.next().is_none());
    }

    #[test]
    fn empty_buffer_has_no_records() {
        assert_eq!(Records::new(b"").count(), 0);
        assert_eq!(Records::new(b"\r\n\r\n").count(), 0);
        assert_eq!(Records::new(b"").format(), None);
    }

    #[test]
    fn truncated_block_is_an_error_after_earlier_records() {
        let mut buf = record("response", b"first");
        let second = record("response", b"second record body");
        buf.extend_from_slice(&second[..second.len() - 10]);

        let mut records = Records::new(&buf);
        assert!(records.next().unwrap().is_ok());
        assert!(matches!(records.next(), Some(Err(_))));
        assert!(records.next().is_none());
    }

    #[test]
    fn truncated_gzip_member_fails_to_decompress() {
        let member = gzip(&record("response", b"compressed body"));
        let buf = &member[..member.len() / 2];

        let mut records = Records::new(buf);
        assert!(matches!(
            records.next(),
            Some(Err(WarcError::Decompress(_)))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn inflation_past_the_limit_fails() {
        let buf = gzip(&record("metadata", &vec![0u8; 64 * 1024]));
        assert!(buf.len() < 4096);

        let mut records = Records::with_limit(&buf, 4096);
        assert!(matches!(
            records.next(),
            Some(Err(WarcError::InflateLimit { limit: 4096 }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn exact_fit_is_within_the_limit() {
        let plain = record("response", b"fits");
        let buf = gzip(&plain);

        let records: Vec<_> = Records::with_limit(&buf, plain.len() as u64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn limit_scales_with_segment_size() {
        assert_eq!(inflate_limit(0), MIN_INFLATE_LIMIT);
        assert_eq!(inflate_limit(1 << 20), 100 << 20);
    }

    #[test]
    fn data_that_is_no_archive_is_an_error() {
        let mut records = Records::new(b"HTTP/1.1 200 OK\r\n\r\n");
        assert!(matches!(records.next(), Some(Err(WarcError::MalformedArc(_)))));
        assert!(records.next().is_none());
    }
}
