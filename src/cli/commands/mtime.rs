//! Mtime command - refresh and print when the index last changed

use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use chrono::{DateTime, Duration, Local, SecondsFormat, Utc};
use tokio_util::sync::CancellationToken;

/// Execute the mtime command
pub async fn execute(config: &Config, cancel: &CancellationToken) -> IndexResult<()> {
    let entry = super::cache_entry(config)?;
    super::refresh(&entry, config, cancel).await?;

    let modified = entry
        .freshness_mark()?
        .ok_or_else(|| IndexError::NotFound(entry.local_path().to_path_buf()))?;
    println!("{}", describe(modified, Utc::now()));
    Ok(())
}

/// `2024-03-14T10:26:53+01:00 (3h2m0s ago)`
fn describe(modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "{} ({} ago)",
        modified
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        format_age(now - modified)
    )
}

/// Compact duration rounded to whole seconds: `1h2m3s`, `4m0s`, `5s`
fn format_age(age: Duration) -> String {
    let millis = age.num_milliseconds();
    let secs = (millis.abs() + 500) / 1000;
    let sign = if millis < 0 && secs > 0 { "-" } else { "" };
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
