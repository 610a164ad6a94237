//! No-op cache implementation.

use async_trait::async_trait;
use downloads_core::{DownloadCache, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `set_with_ttl` always returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DownloadCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        trace!("NoopCache: set_with_ttl called, doing nothing");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        trace!("NoopCache: purge_expired called, returning 0");
        Ok(0)
    }
}
