//! In-memory query cache.
//!
//! This module provides the `QueryCache` that holds the latest JSON value
//! fetched for each `CacheKey`. Entries go stale after a configurable time
//! (5 minutes by default) or when a write invalidates their key; a stale
//! entry is refetched on the next read.

pub mod key;
pub mod manager;

pub use key::{CacheKey, KeyPart};
pub use manager::{CacheSource, CachedData, QueryCache, DEFAULT_STALE_MINUTES};
