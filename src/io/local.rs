use async_trait::async_trait;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

use super::{FetchRange, check_length, inclusive_end};
use crate::error::FetchError;

/// Serves archive ranges from a local copy of the archive tree.
///
/// The archive URL's path is resolved under `root`, so
/// `https://data.commoncrawl.org/crawl-data/X/a.warc.gz` maps to
/// `<root>/crawl-data/X/a.warc.gz`.
pub struct LocalMirrorFetcher {
    root: PathBuf,
    strict_length: bool,
}

impl LocalMirrorFetcher {
    pub fn new(root: impl Into<PathBuf>, strict_length: bool) -> Self {
        Self {
            root: root.into(),
            strict_length,
        }
    }

    /// Local path for an archive URL. Parent-directory segments are refused.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let relative = Path::new(parsed.path().trim_start_matches('/'));

        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(FetchError::InvalidUrl(url.to_string())),
            }
        }

        if path == self.root {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl FetchRange for LocalMirrorFetcher {
    async fn fetch_range(&self, url: &str, offset: u64, length: u64) -> Result<Vec<u8>, FetchError> {
        inclusive_end(offset, length)?;
        let path = self.resolve(url)?;

        tracing::debug!(path = %path.display(), offset, length, "reading segment from mirror");

        let read_path = path.clone();
        let buf = tokio::task::spawn_blocking(move || read_range(&read_path, offset, length))
            .await
            .map_err(|e| FetchError::Mirror {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?
            .map_err(|source| FetchError::Mirror {
                path: path.clone(),
                source,
            })?;

        check_length(length, buf.len(), self.strict_length)?;
        Ok(buf)
    }
}

/// Positional read of up to `length` bytes; stops early at end of file.
fn read_range(path: &Path, offset: u64, length: u64) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let available = size.saturating_sub(offset).min(length);
    let mut buf = vec![0u8; available as usize];

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_exact_at(&mut buf, offset)?;
    }

    #[cfg(not(unix))]
    {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
    }

    Ok(buf)
}
