//! Conditional fetch and staged commit
//!
//! A refresh sends `If-Modified-Since` with the entry's freshness mark. Only
//! a `200 OK` touches the filesystem: the body is streamed into a temporary
//! file next to the cache file, stamped with the remote `Last-Modified`, and
//! renamed over the cache file in one step. A failure at any point drops the
//! temporary file and leaves the previous content in place.
//!
//! The request and every body chunk race the caller's cancellation token, so
//! a cancelled refresh returns as soon as the token fires.

use crate::cache::entry::CacheEntry;
use crate::cache::httpdate;
use crate::config::NetworkConfig;
use crate::error::{IndexError, IndexResult};
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use std::fs::FileTimes;
use std::future::Future;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[cfg(unix)]
const COMMITTED_MODE: u32 = 0o644;

/// Outcome of a successful refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The remote copy has not changed; nothing was written
    NotModified,
    /// New content was committed, stamped with the remote modification time
    Updated { modified: DateTime<Utc> },
}

/// Keeps cache entries in sync with their remote source
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher using the given network settings
    pub fn new(network: &NetworkConfig) -> IndexResult<Self> {
        let mut builder = Client::builder()
            .user_agent(network.user_agent.as_str())
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs));
        if let Some(timeout) = network.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Bring `entry` up to date with its remote source.
    ///
    /// Performs at most one request. Cancelling `cancel` before the final
    /// rename aborts with `Cancelled` and leaves the cache file unchanged.
    pub async fn refresh(
        &self,
        entry: &CacheEntry,
        cancel: &CancellationToken,
    ) -> IndexResult<Refresh> {
        let mark = entry.freshness_mark()?;
        check_cancelled(cancel)?;

        let mut request = self.client.get(entry.url().clone());
        if let Some(mark) = mark {
            debug!("Requesting {} if modified since {}", entry.url(), mark);
            request = request.header(IF_MODIFIED_SINCE, httpdate::format(mark));
        } else {
            debug!("Requesting {} unconditionally", entry.url());
        }

        let response = until_cancelled(cancel, request.send()).await??;

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                info!("{} is up to date", entry.name());
                Ok(Refresh::NotModified)
            }
            StatusCode::OK => {
                let modified = response
                    .headers()
                    .get(LAST_MODIFIED)
                    .ok_or_else(|| {
                        IndexError::Protocol("response has no Last-Modified header".into())
                    })?
                    .to_str()
                    .ok()
                    .and_then(httpdate::parse)
                    .ok_or_else(|| IndexError::Protocol("invalid Last-Modified header".into()))?;

                let body = response
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(IndexError::from));
                commit(entry, body, modified, cancel).await?;
                info!("Updated {} (last modified {})", entry.name(), modified);
                Ok(Refresh::Updated { modified })
            }
            status => Err(IndexError::Remote(status.to_string())),
        }
    }
}

/// Stage `body` next to the cache file and publish it with one rename.
///
/// The staged file is removed when it is dropped, so every early return
/// below, including a cancelled chunk wait, leaves nothing behind.
pub(crate) async fn commit<S, B>(
    entry: &CacheEntry,
    body: S,
    modified: DateTime<Utc>,
    cancel: &CancellationToken,
) -> IndexResult<()>
where
    S: Stream<Item = IndexResult<B>>,
    B: AsRef<[u8]>,
{
    let mut body = std::pin::pin!(body);
    let base_dir = entry.base_dir();
    let staged = tempfile::Builder::new()
        .prefix(&format!(".{}.", entry.name()))
        .suffix(".tmp")
        .tempfile_in(base_dir)
        .map_err(|e| {
            IndexError::io(
                format!("creating temporary file in {}", base_dir.display()),
                e,
            )
        })?;
    debug!("Staging {} in {}", entry.name(), staged.path().display());

    let handle = staged
        .as_file()
        .try_clone()
        .map_err(|e| IndexError::io("opening temporary file", e))?;
    let mut file = tokio::fs::File::from_std(handle);

    let mut written = 0u64;
    while let Some(chunk) = until_cancelled(cancel, body.next()).await? {
        let chunk = chunk?;
        file.write_all(chunk.as_ref())
            .await
            .map_err(|e| IndexError::io("writing temporary file", e))?;
        written += chunk.as_ref().len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| IndexError::io("writing temporary file", e))?;
    drop(file);

    let local_path = entry.local_path().to_path_buf();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || publish(staged, &local_path, modified, &cancel))
        .await
        .map_err(|e| IndexError::Internal(format!("commit task failed: {}", e)))??;

    debug!(
        "Committed {} bytes to {}",
        written,
        entry.local_path().display()
    );
    Ok(())
}

/// Apply the final mode and timestamps, flush to disk and rename into place
fn publish(
    staged: NamedTempFile,
    local_path: &Path,
    modified: DateTime<Utc>,
    cancel: &CancellationToken,
) -> IndexResult<()> {
    let file = staged.as_file();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(COMMITTED_MODE))
            .map_err(|e| IndexError::io("setting temporary file permissions", e))?;
    }

    let time = SystemTime::from(modified);
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
        .map_err(|e| IndexError::io("setting temporary file times", e))?;
    file.sync_all()
        .map_err(|e| IndexError::io("syncing temporary file", e))?;

    check_cancelled(cancel)?;
    staged.persist(local_path).map_err(|e| {
        IndexError::io(
            format!("renaming staged file to {}", local_path.display()),
            e.error,
        )
    })?;
    Ok(())
}

/// Resolve `future` unless `cancel` fires first
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> IndexResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Refresh cancelled");
            Err(IndexError::Cancelled)
        }
        output = future => Ok(output),
    }
}

fn check_cancelled(cancel: &CancellationToken) -> IndexResult<()> {
    if cancel.is_cancelled() {
        debug!("Refresh cancelled");
        return Err(IndexError::Cancelled);
    }
    Ok(())
}
