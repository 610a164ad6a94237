//! Cache trait for storing registry responses.
//!
//! This module defines the [`DownloadCache`] trait: a plain key-value store with
//! per-entry expiry. Values are JSON documents; entries are never invalidated
//! explicitly and simply expire after their TTL.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Default time-to-live for cached registry responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Key-value cache with per-entry expiry.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated registry calls. Concurrent writers to the same key simply
/// overwrite each other.
#[async_trait]
pub trait DownloadCache: Send + Sync {
    /// Retrieves a cached value.
    ///
    /// Returns `Ok(Some(json))` if a live entry exists, `Ok(None)` otherwise.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Removes expired entries from backing storage.
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self) -> Result<usize>;
}

/// Builds the cache key for a package's download range.
///
/// `api_range` is the normalized registry range string, so explicit and derived
/// ranges resolving to the same dates share an entry.
#[must_use]
pub fn downloads_key(package: &str, api_range: &str) -> String {
    format!("downloads:{package}:{api_range}")
}

/// Builds the cache key for a package search query (case-insensitive).
#[must_use]
pub fn search_key(query: &str) -> String {
    format!("search:{}", query.to_lowercase())
}
