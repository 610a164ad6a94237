//! Cache-aside fetching of registry data.

use std::{future::Future, sync::Arc};

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use downloads_core::{
    DEFAULT_SEARCH_SIZE, DownloadCache, PackageDownloads, RegistryProvider, Result, SearchResults,
    TimeRange,
    cache::{downloads_key, search_key},
};
use downloads_npm::NpmProvider;

use crate::config::FetcherConfig;

/// Fetches download data through a cache.
///
/// In production mode the cache is read before every registry call, and a miss is
/// written back by a detached task after the result has been handed to the caller.
/// Cache failures never fail a fetch. In development mode the cache is bypassed.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use downloads::{CachedFetcher, FetcherConfig, InMemoryCache, TimeRange};
///
/// let fetcher = CachedFetcher::npm(Arc::new(InMemoryCache::new()), FetcherConfig::default());
/// let react = fetcher.fetch("react", &TimeRange::default()).await?;
/// ```
#[derive(Clone)]
pub struct CachedFetcher {
    provider: Arc<dyn RegistryProvider>,
    cache: Arc<dyn DownloadCache>,
    config: FetcherConfig,
}

impl std::fmt::Debug for CachedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("provider", &self.provider.name())
            .field("cache", &"configured")
            .field("config", &self.config)
            .finish()
    }
}

impl CachedFetcher {
    /// Creates a fetcher over an arbitrary provider and cache.
    #[must_use]
    pub fn new(
        provider: Arc<dyn RegistryProvider>,
        cache: Arc<dyn DownloadCache>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Creates a fetcher for the public npm registry using the configured request timeout.
    #[must_use]
    pub fn npm(cache: Arc<dyn DownloadCache>, config: FetcherConfig) -> Self {
        let provider = Arc::new(NpmProvider::with_timeout(config.request_timeout));
        Self::new(provider, cache, config)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetches daily downloads for `package` over `range`, resolved against today's UTC date.
    pub async fn fetch(&self, package: &str, range: &TimeRange) -> Result<PackageDownloads> {
        self.fetch_at(package, range, Utc::now().date_naive()).await
    }

    /// Fetches daily downloads with derived ranges resolved against `today`.
    ///
    /// # Errors
    /// Transport and upstream errors from the provider are returned unchanged.
    #[instrument(skip(self), fields(package = %package, range = %range))]
    pub async fn fetch_at(
        &self,
        package: &str,
        range: &TimeRange,
        today: NaiveDate,
    ) -> Result<PackageDownloads> {
        let api_range = range.to_api_range(today);
        let key = downloads_key(package, &api_range);

        self.cache_aside(key, || self.provider.fetch_downloads(package, &api_range))
            .await
    }

    /// Fetches every package concurrently. Fails as a whole if any fetch fails.
    pub async fn fetch_all(
        &self,
        packages: &[String],
        range: &TimeRange,
    ) -> Result<Vec<PackageDownloads>> {
        self.fetch_all_at(packages, range, Utc::now().date_naive())
            .await
    }

    /// Concurrent [`fetch_at`](Self::fetch_at) for every package, in input order.
    pub async fn fetch_all_at(
        &self,
        packages: &[String],
        range: &TimeRange,
        today: NaiveDate,
    ) -> Result<Vec<PackageDownloads>> {
        debug!(package_count = packages.len(), "Fetching packages");
        try_join_all(packages.iter().map(|p| self.fetch_at(p, range, today))).await
    }

    /// Searches the registry, caching results per lowercased query.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let key = search_key(query);
        self.cache_aside(key, || self.provider.search(query, DEFAULT_SEARCH_SIZE))
            .await
    }

    async fn cache_aside<T, F, Fut>(&self, key: String, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.config.mode.bypasses_cache() {
            debug!(key = %key, "Development mode, bypassing cache");
            return load().await;
        }

        match self.cache.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => {
                    debug!(key = %key, "Serving from cache");
                    return Ok(value);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }

        let value = load().await?;
        self.spawn_write(key, &value);
        Ok(value)
    }

    /// Schedules a detached cache write followed by a purge of expired entries.
    /// Failures are only logged.
    fn spawn_write<T: Serialize>(&self, key: String, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        let cache = Arc::clone(&self.cache);
        let ttl = self.config.cache_ttl;
        tokio::spawn(async move {
            if let Err(e) = cache.set_with_ttl(&key, &json, ttl).await {
                warn!(key = %key, error = %e, "Failed to cache registry response");
                return;
            }
            match cache.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired cache entries"),
                Err(e) => warn!(error = %e, "Failed to purge expired cache entries"),
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use downloads_cache::InMemoryCache;
    use downloads_core::{DownloadSample, DownloadsError, NamedRange};

    use crate::config::ExecutionMode;

    /// Registry stand-in serving ten downloads a day for every package except `missing`.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRegistry {
        pub(crate) calls: AtomicUsize,
    }

    impl FakeRegistry {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[async_trait]
    impl RegistryProvider for FakeRegistry {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_downloads(&self, package: &str, api_range: &str) -> Result<PackageDownloads> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if package == "missing" {
                return Err(DownloadsError::Upstream {
                    status: 404,
                    url: format!("fake://{api_range}/{package}"),
                });
            }

            let start = day(2024, 1, 1);
            let downloads = (0..14)
                .map(|i| DownloadSample::new(start + chrono::Days::new(i), 10))
                .collect();
            Ok(PackageDownloads {
                start,
                end: day(2024, 1, 14),
                package: package.to_string(),
                downloads,
            })
        }

        async fn search(&self, _text: &str, _size: usize) -> Result<SearchResults> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResults::default())
        }
    }

    /// Cache whose every operation fails.
    #[derive(Debug)]
    struct BrokenCache;

    #[async_trait]
    impl DownloadCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(DownloadsError::Cache("unavailable".to_string()))
        }

        async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(DownloadsError::Cache("unavailable".to_string()))
        }

        async fn purge_expired(&self) -> Result<usize> {
            Err(DownloadsError::Cache("unavailable".to_string()))
        }
    }

    async fn wait_for_entry(cache: &InMemoryCache, key: &str) -> bool {
        for _ in 0..100 {
            if cache.get(key).await.ok().flatten().is_some() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        false
    }

    fn setup(mode: ExecutionMode) -> (Arc<FakeRegistry>, Arc<InMemoryCache>, CachedFetcher) {
        let registry = Arc::new(FakeRegistry::default());
        let cache = Arc::new(InMemoryCache::new());
        let fetcher = CachedFetcher::new(
            registry.clone(),
            cache.clone(),
            FetcherConfig::default().with_mode(mode),
        );
        (registry, cache, fetcher)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (registry, cache, fetcher) = setup(ExecutionMode::Production);
        let range = TimeRange::Named(NamedRange::LastMonth);

        let first = fetcher.fetch("react", &range).await.unwrap();
        assert_eq!(registry.calls(), 1);
        assert!(wait_for_entry(&cache, "downloads:react:last-month").await);

        let second = fetcher.fetch("react", &range).await.unwrap();
        assert_eq!(registry.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_derived_range_key() {
        let (_, cache, fetcher) = setup(ExecutionMode::Production);
        let range = TimeRange::Named(NamedRange::LastTwoYears);

        fetcher
            .fetch_at("vue", &range, day(2024, 6, 15))
            .await
            .unwrap();
        assert!(wait_for_entry(&cache, "downloads:vue:2022-06-15:2024-06-15").await);
    }

    #[tokio::test]
    async fn test_write_purges_expired_entries() {
        let (_, cache, fetcher) = setup(ExecutionMode::Production);
        cache
            .set_with_ttl("downloads:vue:last-week", "{}", Duration::ZERO)
            .await
            .unwrap();

        fetcher.fetch("react", &TimeRange::default()).await.unwrap();
        assert!(wait_for_entry(&cache, "downloads:react:last-year").await);

        let mut purged = false;
        for _ in 0..100 {
            if cache.len().await == 1 {
                purged = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(purged);
    }

    #[tokio::test]
    async fn test_development_bypasses_cache() {
        let (registry, cache, fetcher) = setup(ExecutionMode::Development);
        let range = TimeRange::default();

        fetcher.fetch("react", &range).await.unwrap();
        fetcher.fetch("react", &range).await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(registry.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_failures_do_not_fail_fetch() {
        let registry = Arc::new(FakeRegistry::default());
        let fetcher = CachedFetcher::new(
            registry.clone(),
            Arc::new(BrokenCache),
            FetcherConfig::default(),
        );

        let data = fetcher.fetch("react", &TimeRange::default()).await.unwrap();
        assert_eq!(data.total(), 140);
        tokio::task::yield_now().await;
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_refetched() {
        let (registry, cache, fetcher) = setup(ExecutionMode::Production);
        cache
            .set_with_ttl("downloads:react:last-week", "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let data = fetcher
            .fetch("react", &TimeRange::Named(NamedRange::LastWeek))
            .await
            .unwrap();
        assert_eq!(data.package, "react");
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_is_not_cached() {
        let (registry, cache, fetcher) = setup(ExecutionMode::Production);

        let err = fetcher
            .fetch("missing", &TimeRange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadsError::Upstream { status: 404, .. }));
        tokio::task::yield_now().await;
        assert!(cache.is_empty().await);
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let (registry, _, fetcher) = setup(ExecutionMode::Production);
        let packages = vec!["react".to_string(), "vue".to_string()];

        let data = fetcher
            .fetch_all(&packages, &TimeRange::default())
            .await
            .unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].package, "react");
        assert_eq!(data[1].package, "vue");
        assert_eq!(registry.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_fails_as_a_whole() {
        let (_, _, fetcher) = setup(ExecutionMode::Production);
        let packages = vec!["react".to_string(), "missing".to_string()];

        let result = fetcher.fetch_all(&packages, &TimeRange::default()).await;
        assert!(matches!(result, Err(DownloadsError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_search_is_cached_case_insensitively() {
        let (registry, cache, fetcher) = setup(ExecutionMode::Production);

        fetcher.search("React").await.unwrap();
        assert!(wait_for_entry(&cache, "search:react").await);
        fetcher.search("react").await.unwrap();

        assert_eq!(registry.calls(), 1);
    }
}
