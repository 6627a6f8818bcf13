//! Decoding of the HTTP message stored in a response record block.
//!
//! Only used in [`PayloadMode::HttpBody`](super::PayloadMode::HttpBody).
//! The HTTP header block is dropped, then transfer and content encodings are
//! undone. Encodings are best-effort: a body that fails to decode is kept as
//! stored rather than failing the record.

use std::io::Read;

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};

use crate::error::WarcError;

/// HTTP body of a response block.
///
/// Blocks that do not start with an HTTP status line are returned unchanged.
pub fn http_body(block: &[u8]) -> Result<Vec<u8>, WarcError> {
    if !block.starts_with(b"HTTP/") {
        return Ok(block.to_vec());
    }

    let (head, body) = split_head(block)
        .ok_or_else(|| WarcError::HttpPayload("HTTP header block is not terminated".into()))?;
    let head = String::from_utf8_lossy(head);

    let mut chunked = false;
    let mut content_encoding = String::new();
    for line in head.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_ascii_lowercase();
        match name.trim().to_ascii_lowercase().as_str() {
            "transfer-encoding" => chunked |= value.contains("chunked"),
            "content-encoding" => content_encoding = value,
            _ => {}
        }
    }

    let body = if chunked {
        match dechunk(body) {
            Ok(data) => data,
            Err(reason) => {
                tracing::debug!(reason, "keeping chunked body as stored");
                body.to_vec()
            }
        }
    } else {
        body.to_vec()
    };

    Ok(decode_content(body, &content_encoding))
}

/// Split at the first empty line. Accepts CRLF and bare LF endings.
fn split_head(block: &[u8]) -> Option<(&[u8], &[u8])> {
    let crlf = find(block, b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = find(block, b"\n\n").map(|i| (i, i + 2));
    let (head_end, body_start) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (a, b) => a.or(b)?,
    };
    Some((&block[..head_end], &block[body_start..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Undo `Transfer-Encoding: chunked`. Trailers after the last chunk are ignored.
fn dechunk(body: &[u8]) -> Result<Vec<u8>, &'static str> {
    let mut out = Vec::with_capacity(body.len());
    let mut pos = 0;

    loop {
        let line_len = body[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .ok_or("missing chunk size line")?;
        let line = std::str::from_utf8(&body[pos..pos + line_len]).map_err(|_| "invalid chunk size")?;
        let size_text = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_text, 16).map_err(|_| "invalid chunk size")?;
        pos += line_len + 1;

        if size == 0 {
            return Ok(out);
        }

        let end = pos
            .checked_add(size)
            .filter(|&end| end <= body.len())
            .ok_or("chunk runs past end of body")?;
        out.extend_from_slice(&body[pos..end]);
        pos = end;

        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        } else if body[pos..].starts_with(b"\n") {
            pos += 1;
        }
    }
}

fn decode_content(body: Vec<u8>, encoding: &str) -> Vec<u8> {
    let decoded = match encoding {
        "gzip" | "x-gzip" => read_all(MultiGzDecoder::new(&body[..])),
        // Servers disagree on whether "deflate" carries a zlib wrapper.
        "deflate" => read_all(ZlibDecoder::new(&body[..]))
            .or_else(|_| read_all(DeflateDecoder::new(&body[..]))),
        "" | "identity" => return body,
        other => {
            tracing::debug!(encoding = other, "unsupported content encoding, keeping body as stored");
            return body;
        }
    };

    match decoded {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(encoding, error = %e, "content decoding failed, keeping body as stored");
            body
        }
    }
}

fn read_all(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}
