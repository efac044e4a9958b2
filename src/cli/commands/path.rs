//! Path command - print where the cached index lives

use crate::config::Config;
use crate::error::IndexResult;

/// Execute the path command
pub async fn execute(config: &Config) -> IndexResult<()> {
    let entry = super::cache_entry(config)?;
    println!("{}", entry.local_path().display());
    Ok(())
}
