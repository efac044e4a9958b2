//! Cache entry identity and freshness
//!
//! An entry maps one remote URL to one file in a base directory. The file's
//! own modification time is the freshness record; there is no index or
//! sidecar metadata, so the same URL finds the same file across runs.

use crate::cache::gzip::GzipReader;
use crate::error::{IndexError, IndexResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// One cached remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    url: Url,
    name: String,
    base_dir: PathBuf,
    local_path: PathBuf,
}

impl CacheEntry {
    /// Derive an entry from `url`. Performs no I/O.
    ///
    /// The file name is the last path segment of the URL, which must be
    /// non-empty.
    pub fn new(url: Url, base_dir: impl Into<PathBuf>) -> IndexResult<Self> {
        let name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .map(str::to_string)
            .ok_or_else(|| IndexError::invalid_url(url.as_str(), "no file name in URL path"))?;

        let base_dir = base_dir.into();
        let local_path = base_dir.join(&name);

        Ok(Self {
            url,
            name,
            base_dir,
            local_path,
        })
    }

    /// Parse `url` and derive an entry from it
    pub fn parse(url: &str, base_dir: impl Into<PathBuf>) -> IndexResult<Self> {
        let parsed = Url::parse(url).map_err(|e| IndexError::invalid_url(url, e.to_string()))?;
        Self::new(parsed, base_dir)
    }

    /// Remote location of the resource
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// File name derived from the URL
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the cache file and its staging files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where the committed content lives
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Create the base directory if it does not exist yet
    pub fn ensure_base_dir(&self) -> IndexResult<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            IndexError::io(format!("creating directory {}", self.base_dir.display()), e)
        })
    }

    /// Modification time of the committed file, or `None` if nothing has
    /// been committed yet.
    pub fn freshness_mark(&self) -> IndexResult<Option<DateTime<Utc>>> {
        let metadata = match fs::metadata(&self.local_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cached copy at {}", self.local_path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(IndexError::io(
                    format!("reading metadata of {}", self.local_path.display()),
                    e,
                ))
            }
        };

        let modified = metadata.modified().map_err(|e| {
            IndexError::io(
                format!("reading modification time of {}", self.local_path.display()),
                e,
            )
        })?;
        Ok(Some(modified.into()))
    }

    /// Open the committed file as a stream of decompressed bytes
    pub fn read_decompressed(&self) -> IndexResult<GzipReader> {
        GzipReader::open(&self.local_path)
    }
}
