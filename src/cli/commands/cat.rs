//! Cat command - refresh and print the decompressed index

use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use std::io::{self, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Execute the cat command
pub async fn execute(config: &Config, cancel: &CancellationToken) -> IndexResult<()> {
    let entry = super::cache_entry(config)?;
    super::refresh(&entry, config, cancel).await?;

    let reader = entry.read_decompressed()?;
    debug!("Streaming {}", reader.path().display());
    let cancel = cancel.clone();
    let written = super::blocking(move || {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        reader.copy_to(&mut out, &cancel)
    })
    .await;

    match written {
        Ok(bytes) => {
            debug!("Wrote {} decompressed bytes", bytes);
            Ok(())
        }
        // Reader went away early, e.g. `cpan-index | head`
        Err(IndexError::Io { source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed early");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
