//! Per-descriptor processing: fetch, extract, write, report.
//!
//! Each descriptor moves through
//! `Parsed -> Fetching -> Fetched -> Extracting -> (Writing)* -> Done`,
//! or ends in `Failed` when the fetch, the record walk or a write fails.
//! A failure only ends its own descriptor; files written before it stay on
//! disk and the run continues with the next descriptor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::config::ExtractConfig;
use crate::descriptor::{Descriptor, parse_list};
use crate::error::{Error, Result};
use crate::io::{FetchRange, HttpRangeFetcher, LocalMirrorFetcher};
use crate::output::{OutputWriter, suggested_name};
use crate::warc::WarcExtractor;

/// Lifecycle of one descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorState {
    Parsed,
    Fetching,
    Fetched,
    Extracting,
    Writing,
    Done,
    Failed,
}

/// How one descriptor ended
#[derive(Debug)]
pub enum Outcome {
    Done { files: Vec<PathBuf> },
    Failed { error: Error, files: Vec<PathBuf> },
}

impl Outcome {
    /// Files created for the descriptor, including those written before a failure.
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Outcome::Done { files } | Outcome::Failed { files, .. } => files,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub descriptors: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub files_written: usize,
    pub bytes_fetched: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome, fetched: u64) {
        self.descriptors += 1;
        self.files_written += outcome.files().len();
        self.bytes_fetched += fetched;
        if outcome.is_failed() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries: {} succeeded, {} failed, {} files written",
            self.descriptors, self.succeeded, self.failed, self.files_written
        )
    }
}

/// Drives descriptors through fetch, extraction and output.
pub struct Pipeline<F: FetchRange> {
    fetcher: Arc<F>,
    extractor: WarcExtractor,
    writer: OutputWriter,
    jobs: usize,
    quiet: bool,
}

// Manual impl: `F` itself need not be `Clone`.
impl<F: FetchRange> Clone for Pipeline<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            extractor: self.extractor,
            writer: self.writer.clone(),
            jobs: self.jobs,
            quiet: self.quiet,
        }
    }
}

impl<F: FetchRange + 'static> Pipeline<F> {
    pub fn new(fetcher: Arc<F>, extractor: WarcExtractor, writer: OutputWriter) -> Self {
        Self {
            fetcher,
            extractor,
            writer,
            jobs: 1,
            quiet: false,
        }
    }

    /// Process up to `jobs` descriptors at once (minimum 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Suppress progress lines on stdout.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Process every descriptor and report each outcome.
    ///
    /// Sequential runs keep input order. With more than one job, outcomes are
    /// reported as descriptors complete.
    pub async fn run(&self, descriptors: Vec<Descriptor>) -> RunSummary {
        let mut summary = RunSummary::default();

        if self.jobs == 1 {
            for descriptor in &descriptors {
                let (outcome, fetched) = self.process(descriptor).await;
                self.report(descriptor, &outcome);
                summary.record(&outcome, fetched);
            }
            return summary;
        }

        let mut queue = descriptors.into_iter();
        let mut join_set = tokio::task::JoinSet::new();

        loop {
            while join_set.len() < self.jobs {
                let Some(descriptor) = queue.next() else {
                    break;
                };
                let pipeline = self.clone();
                join_set.spawn(async move {
                    let (outcome, fetched) = pipeline.process(&descriptor).await;
                    (descriptor, outcome, fetched)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };

            match joined {
                Ok((descriptor, outcome, fetched)) => {
                    self.report(&descriptor, &outcome);
                    summary.record(&outcome, fetched);
                }
                Err(e) => {
                    tracing::error!(error = %e, "descriptor task failed");
                    let outcome = Outcome::Failed {
                        error: Error::Join(e.to_string()),
                        files: Vec::new(),
                    };
                    summary.record(&outcome, 0);
                }
            }
        }

        summary
    }

    /// Run one descriptor to completion.
    ///
    /// # Returns
    ///
    /// The outcome and the number of segment bytes fetched for it.
    pub async fn process(&self, descriptor: &Descriptor) -> (Outcome, u64) {
        let mut files = Vec::new();
        let mut fetched = 0;

        transition(descriptor, DescriptorState::Parsed);
        let result = self.try_process(descriptor, &mut files, &mut fetched).await;

        let outcome = match result {
            Ok(()) => {
                transition(descriptor, DescriptorState::Done);
                Outcome::Done { files }
            }
            Err(error) => {
                transition(descriptor, DescriptorState::Failed);
                Outcome::Failed { error, files }
            }
        };
        (outcome, fetched)
    }

    async fn try_process(
        &self,
        descriptor: &Descriptor,
        files: &mut Vec<PathBuf>,
        fetched: &mut u64,
    ) -> Result<()> {
        transition(descriptor, DescriptorState::Fetching);
        let buffer = self
            .fetcher
            .fetch_range(&descriptor.archive_url, descriptor.offset, descriptor.length)
            .await?;
        *fetched = buffer.len() as u64;
        transition(descriptor, DescriptorState::Fetched);

        transition(descriptor, DescriptorState::Extracting);
        let name = suggested_name(&descriptor.original_url);

        for payload in self.extractor.payloads(&buffer) {
            let payload = payload?;

            transition(descriptor, DescriptorState::Writing);
            let path = self.writer.write(&name, &payload).await?;
            tracing::info!(
                original_url = %descriptor.original_url,
                path = %path.display(),
                bytes = payload.len(),
                "extracted response"
            );
            if !self.quiet {
                println!("Successfully extracted: {}", display_name(&path));
            }
            files.push(path);
        }

        if files.is_empty() {
            tracing::debug!(original_url = %descriptor.original_url, "no response records in segment");
        }
        Ok(())
    }

    fn report(&self, descriptor: &Descriptor, outcome: &Outcome) {
        if let Outcome::Failed { error, files } = outcome {
            tracing::warn!(
                original_url = %descriptor.original_url,
                archive_url = %descriptor.archive_url,
                kept_files = files.len(),
                error = %error,
                "failed to process descriptor"
            );
            if !self.quiet {
                println!("Failed to process {}: {}", descriptor.original_url, error);
            }
        }
    }
}

fn transition(descriptor: &Descriptor, state: DescriptorState) {
    tracing::trace!(original_url = %descriptor.original_url, ?state, "descriptor state");
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run a whole extraction as configured.
///
/// Reading the list, creating the output directory and building the HTTP
/// client are setup steps: their failure ends the run before any descriptor
/// is processed.
pub async fn run(config: &ExtractConfig) -> anyhow::Result<RunSummary> {
    let text = tokio::fs::read_to_string(&config.list)
        .await
        .with_context(|| format!("failed to read list file {}", config.list.display()))?;

    let writer = OutputWriter::create(&config.output)
        .await
        .with_context(|| format!("failed to create output directory {}", config.output.display()))?;

    let descriptors = parse_list(&text);
    tracing::info!(
        entries = descriptors.len(),
        output = %config.output.display(),
        "starting extraction"
    );

    let extractor = WarcExtractor::new(config.payload_mode);

    let summary = match &config.mirror {
        Some(root) => {
            let fetcher = Arc::new(LocalMirrorFetcher::new(root, config.strict_length));
            Pipeline::new(fetcher, extractor, writer)
                .with_jobs(config.jobs)
                .quiet(config.quiet)
                .run(descriptors)
                .await
        }
        None => {
            let fetcher = HttpRangeFetcher::new(config.timeout, config.strict_length)
                .context("failed to build HTTP client")?;
            Pipeline::new(Arc::new(fetcher), extractor, writer)
                .with_jobs(config.jobs)
                .quiet(config.quiet)
                .run(descriptors)
                .await
        }
    };

    Ok(summary)
}
