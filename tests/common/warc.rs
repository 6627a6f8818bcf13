//! WARC and ARC fixtures: single records, gzip members and archive files
//! with the record placed at a known offset.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

pub const HTTP_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n<html></html>";

/// One uncompressed record, including the trailing separator.
pub fn record(kind: &str, block: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "WARC/1.0\r\n\
         WARC-Type: {kind}\r\n\
         WARC-Target-URI: http://ex.com/a.html\r\n\
         WARC-Date: 2024-02-20T10:00:00Z\r\n\
         Content-Type: application/http; msgtype=response\r\n\
         Content-Length: {}\r\n\r\n",
        block.len()
    )
    .into_bytes();
    out.extend_from_slice(block);
    out.extend_from_slice(b"\r\n\r\n");
    out
}

/// A record compressed as its own gzip member, as in `.warc.gz` files.
pub fn gzip_record(kind: &str, block: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&record(kind, block)).unwrap();
    enc.finish().unwrap()
}

/// One ARC v1 capture compressed as its own gzip member, as in `.arc.gz`.
pub fn gzip_arc_record(url: &str, block: &[u8]) -> Vec<u8> {
    let mut plain =
        format!("{url} 93.184.216.34 20080101000000 text/html {}\n", block.len()).into_bytes();
    plain.extend_from_slice(block);
    plain.push(b'\n');

    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&plain).unwrap();
    enc.finish().unwrap()
}

/// An archive file with `segment` placed after `prefix` bytes of other
/// records. Returns the file and the segment's (offset, length).
pub fn archive_with(prefix: usize, segment: &[u8]) -> (Vec<u8>, u64, u64) {
    let mut file = Vec::new();
    while file.len() < prefix {
        file.extend(gzip_record("warcinfo", b"software: fixture\r\n"));
    }
    let offset = file.len() as u64;
    file.extend_from_slice(segment);
    file.extend(gzip_record("response", b"HTTP/1.1 404 Not Found\r\n\r\n"));
    (file, offset, segment.len() as u64)
}
