//! Minimal HTTP/1.1 server that supports Range GET for integration tests.
//!
//! Serves a fixed set of static files by path. Responds to GET with a
//! `Range: bytes=X-Y` header with 206 Partial Content and records every
//! Range header it receives.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Bytes dropped from the end of every 206 body (simulates short reads).
    pub truncate_by: usize,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            truncate_by: 0,
        }
    }
}

pub struct RangeServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    ranges: Arc<Mutex<Vec<String>>>,
}

impl RangeServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Range header values received so far, in arrival order.
    pub fn ranges(&self) -> Vec<String> {
        self.ranges.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `files`. The server runs
/// until the process exits.
pub fn start(files: Vec<(&str, Vec<u8>)>) -> RangeServer {
    start_with_options(files, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(files: Vec<(&str, Vec<u8>)>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let files: Arc<HashMap<String, Vec<u8>>> = Arc::new(
        files
            .into_iter()
            .map(|(path, body)| (format!("/{}", path.trim_start_matches('/')), body))
            .collect(),
    );
    let ranges = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&ranges);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let files = Arc::clone(&files);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &files, &seen, opts));
        }
    });

    RangeServer {
        base_url: format!("http://127.0.0.1:{}", port),
        ranges,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    files: &HashMap<String, Vec<u8>>,
    seen: &Mutex<Vec<String>>,
    opts: RangeServerOptions,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, range_header) = parse_request(request);
    if let Some(value) = &range_header {
        seen.lock().unwrap().push(value.clone());
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let Some(body) = files.get(path) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    };

    let total = body.len() as u64;
    let range = range_header.as_deref().and_then(parse_range);
    let (status, slice): (&str, &[u8]) = match range {
        Some((start, end_incl)) if opts.support_ranges => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl || start >= total {
                ("416 Range Not Satisfiable", &body[0..0])
            } else {
                let slice = &body[start as usize..=end_incl as usize];
                let keep = slice.len().saturating_sub(opts.truncate_by);
                ("206 Partial Content", &slice[..keep])
            }
        }
        _ => ("200 OK", body.as_slice()),
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (method, path, Range header value).
fn parse_request(request: &str) -> (&str, &str, Option<String>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/");

    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    (method, path, range)
}

/// Parse `bytes=X-Y` into (start, end_inclusive).
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let part = value.strip_prefix("bytes=")?;
    let (a, b) = part.split_once('-')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
