//! Single-resource HTTP cache
//!
//! Keeps one remote gzip file mirrored in a local directory and hands out
//! decompressing readers over the committed copy.
//!
//! # Consistency Model
//!
//! - The committed file's modification time is the remote `Last-Modified`
//! - Refreshes are conditional (`If-Modified-Since`); `304` writes nothing
//! - New content is staged beside the cache file and published by rename
//! - Readers keep the content they opened, even across a commit
//!
//! # Refresh Outcomes
//!
//! | Response | Filesystem | Result |
//! |----------|------------|--------|
//! | 304 | untouched | `Refresh::NotModified` |
//! | 200 + valid `Last-Modified` | staged, renamed | `Refresh::Updated` |
//! | 200 without `Last-Modified` | untouched | `IndexError::Protocol` |
//! | anything else | untouched | `IndexError::Remote` |

pub mod entry;
pub mod fetch;
pub mod gzip;
pub mod httpdate;

pub use entry::CacheEntry;
pub use fetch::{Fetcher, Refresh};
pub use gzip::GzipReader;
