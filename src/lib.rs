//! cpan-index - keep a local copy of the CPAN package index fresh
//!
//! Mirrors one gzip-compressed remote file with conditional requests and
//! atomic commits, and streams its decompressed content.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{IndexError, IndexResult};
