use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DEFAULT_TIMEOUT_SECS, ExtractConfig};
use crate::warc::PayloadMode;

#[derive(Parser, Debug)]
#[command(name = "warcrange")]
#[command(version)]
#[command(
    about = "Download specific segments from Common Crawl WARC files and save the content to files.",
    long_about = None
)]
#[command(after_help = "Examples:\n  \
  warcrange -l urls.txt -o ./output_directory\n  \
  warcrange -l urls.txt -o ./out -j 8 --http-body\n  \
  warcrange -l urls.txt -o ./out --mirror /data/commoncrawl\n\n\
Each entry of the list follows the format:\n  \
  Original: <URL> -- <WARC_URL>#offset=<OFFSET>&length=<LENGTH>\n\
and entries are separated by --")]
pub struct Cli {
    /// File containing the list of URLs with offsets and lengths
    #[arg(short = 'l', long = "list", value_name = "FILE")]
    pub list: PathBuf,

    /// Directory to save the extracted content (created if missing)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Number of entries processed concurrently
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Accept segments shorter or longer than the requested length
    #[arg(long = "allow-short-read")]
    pub allow_short_read: bool,

    /// Save only the decoded HTTP body instead of the full archived response
    #[arg(long = "http-body")]
    pub http_body: bool,

    /// Read archive ranges from a local mirror of the archive tree
    #[arg(long = "mirror", value_name = "DIR")]
    pub mirror: Option<PathBuf>,

    /// Quiet mode (no per-file messages)
    #[arg(short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose logging (-vv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn payload_mode(&self) -> PayloadMode {
        if self.http_body {
            PayloadMode::HttpBody
        } else {
            PayloadMode::Block
        }
    }

    /// Log filter directive for this crate, before `RUST_LOG` overrides.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    pub fn to_config(&self) -> ExtractConfig {
        ExtractConfig {
            list: self.list.clone(),
            output: self.output.clone(),
            jobs: usize::from(self.jobs),
            timeout: Duration::from_secs(self.timeout),
            strict_length: !self.allow_short_read,
            payload_mode: self.payload_mode(),
            mirror: self.mirror.clone(),
            quiet: self.quiet,
        }
    }
}
