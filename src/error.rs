//! Error types for cpan-index
//!
//! All modules use `IndexResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cpan-index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// All errors that can occur in cpan-index
#[derive(Error, Debug)]
pub enum IndexError {
    // Cache errors
    #[error("Cached file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cached file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    // Remote errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Unexpected response status; the message is the status line itself
    #[error("{0}")]
    Remote(String),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot determine home directory for the default cache location")]
    HomeDirUnavailable,

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl IndexError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Cancelled)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Corrupt { .. } => {
                Some("Remove the cached file and run again to download a fresh copy")
            }
            Self::HomeDirUnavailable => Some("Set --cache-dir or CPAN_INDEX_CACHE_DIR"),
            Self::Transport(_) => Some("Check your network connection and the source URL"),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        // The configured deadline is the caller's cancellation signal
        if err.is_timeout() {
            Self::Cancelled
        } else {
            Self::Transport(err)
        }
    }
}
