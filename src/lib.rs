//! # warcrange
//!
//! Extract HTTP responses from remote WARC archives using Range requests.
//!
//! Web-archive indexes (such as the Common Crawl CDX/columnar index) tell
//! you which archive file holds a capture and at which byte offset and
//! length its record sits. This library fetches exactly that byte range,
//! walks the WARC records it contains and writes the payload of every
//! `response` record to a local file, without downloading whole archives.
//!
//! ## Features
//!
//! - Parse index listings of `Original: <url> -- <warc-url>#offset=N&length=M` entries
//! - Fetch single records from HTTP/HTTPS archives with one Range request
//! - Read the same ranges from a local mirror of the archive tree
//! - Uncompressed `.warc`, per-record gzip `.warc.gz` and legacy `.arc.gz` layouts
//! - Full archived response or decoded HTTP body output
//! - Collision-safe output naming, also under concurrent writers
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use warcrange::{HttpRangeFetcher, OutputWriter, Pipeline, WarcExtractor, parse_list};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let list = "Original: http://example.com/ -- \
//!                 https://data.commoncrawl.org/crawl-data/x.warc.gz#offset=1234&length=5678";
//!
//!     let fetcher = Arc::new(HttpRangeFetcher::new(Duration::from_secs(30), true)?);
//!     let writer = OutputWriter::create("./out").await?;
//!     let pipeline = Pipeline::new(fetcher, WarcExtractor::default(), writer);
//!
//!     let summary = pipeline.run(parse_list(list)).await;
//!     println!("{summary}");
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod warc;

pub use cli::Cli;
pub use config::ExtractConfig;
pub use descriptor::{Descriptor, parse_entry, parse_list};
pub use error::{Error, FetchError, WarcError};
pub use io::{FetchRange, HttpRangeFetcher, LocalMirrorFetcher};
pub use output::{OutputWriter, suggested_name};
pub use pipeline::{Outcome, Pipeline, RunSummary};
pub use warc::{PayloadMode, WarcExtractor};
