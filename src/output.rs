//! Writing extracted payloads to the output directory.
//!
//! File names come from the last path segment of the original URL. A name
//! is claimed with create-new semantics, so an existing file is never
//! overwritten and two writers can never end up with the same file; on a
//! collision `_1`, `_2`, ... is inserted before the extension.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Used when the original URL has no usable path segment.
pub const DEFAULT_NAME: &str = "index.html";

/// Writes payloads into one output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Use `dir` as the output directory, creating it and any missing
    /// parents.
    pub async fn create(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `payload` under the first free variant of `suggested`.
    ///
    /// # Returns
    ///
    /// The path of the file that was created.
    ///
    /// # Errors
    ///
    /// Any filesystem error other than a name collision. A file that was
    /// created but could not be fully written is removed again.
    pub async fn write(&self, suggested: &str, payload: &[u8]) -> Result<PathBuf> {
        let (stem, ext) = split_extension(suggested);

        let mut counter = 0u64;
        loop {
            let name = if counter == 0 {
                suggested.to_string()
            } else {
                format!("{stem}_{counter}{ext}")
            };
            let path = self.dir.join(&name);
            counter += 1;

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(Error::Write { path, source }),
            };

            let written = async {
                file.write_all(payload).await?;
                file.flush().await
            }
            .await;

            if let Err(source) = written {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(Error::Write { path, source });
            }

            tracing::debug!(path = %path.display(), bytes = payload.len(), "payload written");
            return Ok(path);
        }
    }
}

/// File name suggested by an original URL: its last non-empty path segment.
pub fn suggested_name(original_url: &str) -> String {
    let segment = match url::Url::parse(original_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => original_url
            .rsplit('/')
            .next()
            .map(str::to_string),
    };

    match segment {
        Some(s) if !s.is_empty() && s != "." && s != ".." => s,
        _ => DEFAULT_NAME.to_string(),
    }
}

/// Split `name` into stem and extension (extension keeps its dot).
///
/// Leading dots do not start an extension: `.htaccess` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.split_at(dot),
        _ => (name, ""),
    }
}
