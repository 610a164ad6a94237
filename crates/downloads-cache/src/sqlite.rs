//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use downloads_core::{DownloadCache, DownloadsError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based key-value cache.
///
/// This cache stores entries in a SQLite database file, providing persistence across
/// restarts and sharing between processes on the same host. Expiry is stored as unix
/// milliseconds and checked on every read.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DownloadsError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DownloadsError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_cache (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_kv_cache_expires_at ON kv_cache(expires_at)",
            [],
        )
        .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl DownloadCache for SqliteCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_cache WHERE key = ?1 AND expires_at > ?2",
                params![key, now_millis()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        if value.is_some() {
            debug!("Cache hit");
        } else {
            debug!("Cache miss");
        }
        Ok(value)
    }

    #[instrument(skip(self, value), fields(key = %key, bytes = value.len()))]
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| DownloadsError::Cache(format!("Invalid TTL duration: {}", e)))?;
        let now = now_millis();
        let expires_at = now.saturating_add(ttl.num_milliseconds());

        let conn = self
            .conn
            .lock()
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO kv_cache (key, value, expires_at, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, expires_at, now],
        )
        .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        debug!(ttl_secs = ttl.num_seconds(), "Cached value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM kv_cache WHERE expires_at <= ?1",
                params![now_millis()],
            )
            .map_err(|e| DownloadsError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Purged {} expired cache entries", deleted);
        }

        Ok(deleted)
    }
}
