//! Command output caching for cacheout
//!
//! This crate provides the caching core behind the `cacheout` CLI:
//! - Deterministic cache keys derived from the command string
//! - Time-based freshness of recorded captures
//! - Execute-and-capture with simultaneous live output
//! - Cache directory location, listing and clearing
//!
//! # Overview
//!
//! A cache entry is a single file named by the command's [`CacheKey`]. Its
//! contents are the exact stdout bytes of the command and its modification
//! time is the capture time. There is no index file: identity comes from the
//! file name, freshness from the file's mtime.
//!
//! Entries only ever appear through an atomic rename, so a run that crashes or
//! fails half way never leaves a capture that could be replayed.

#![expect(
    clippy::missing_errors_doc,
    reason = "All fallible operations return the crate Error documented on its variants"
)]

mod error;
pub mod fanout;
pub mod freshness;
pub mod key;
pub mod resolve;
pub mod store;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use fanout::FanOut;
pub use freshness::{Validity, is_fresh};
pub use key::CacheKey;
pub use resolve::{Resolution, split_command};
pub use store::{CACHE_DIR_ENV, CACHE_SUBDIR, CacheEntry, CacheStore};
