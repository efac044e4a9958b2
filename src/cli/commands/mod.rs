//! CLI command implementations

pub mod cat;
pub mod config;
pub mod mtime;
pub mod path;

pub use cat::execute as cat;
pub use config::execute as config;
pub use mtime::execute as mtime;
pub use path::execute as path;

use crate::cache::{CacheEntry, Fetcher, Refresh};
use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use crate::ui::{TaskSpinner, UiContext};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cache entry for the configured source
pub(crate) fn cache_entry(config: &Config) -> IndexResult<CacheEntry> {
    let url = config.source_url()?;
    let base_dir = config.cache_dir(&url)?;
    CacheEntry::new(url, base_dir)
}

/// Bring the cached copy up to date, showing a spinner while the request runs
pub(crate) async fn refresh(
    entry: &CacheEntry,
    config: &Config,
    cancel: &CancellationToken,
) -> IndexResult<Refresh> {
    entry.ensure_base_dir()?;
    let fetcher = Fetcher::new(&config.network)?;

    let spinner = TaskSpinner::start(
        &UiContext::detect(),
        &format!("Refreshing {}", entry.name()),
    );
    let outcome = fetcher.refresh(entry, cancel).await;
    spinner.finish();

    if let Err(e) = &outcome {
        debug!(
            "Refresh of {} failed (retryable: {}): {}",
            entry.url(),
            e.is_retryable(),
            e
        );
    }
    outcome
}

/// Run blocking filesystem work off the async runtime
pub(crate) async fn blocking<T, F>(work: F) -> IndexResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> IndexResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| IndexError::Internal(format!("blocking task failed: {}", e)))?
}
