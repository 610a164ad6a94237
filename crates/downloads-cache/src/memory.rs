//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use downloads_core::{DownloadCache, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            value,
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-process cache for tests and single-instance deployments.
///
/// Entries live in a `RwLock`-protected `HashMap` and are lost when the cache is
/// dropped. Expired entries are evicted when read and removed in bulk by
/// [`purge_expired`](DownloadCache::purge_expired).
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DownloadCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        {
            let cache = self.entries.read().await;
            match cache.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!("Cache hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    debug!("Cache miss");
                    return Ok(None);
                }
            }
        }

        // Re-check under the write lock: a writer may have refreshed the entry.
        let mut cache = self.entries.write().await;
        if cache.get(key).is_some_and(|entry| entry.is_expired(now)) {
            cache.remove(key);
            debug!("Evicted expired cache entry");
        }
        Ok(None)
    }

    #[instrument(skip(self, value), fields(key = %key, bytes = value.len()))]
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut cache = self.entries.write().await;
        cache.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        debug!(ttl_secs = ttl.as_secs(), "Cached value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut cache = self.entries.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_expired(now));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }

        Ok(removed)
    }
}
