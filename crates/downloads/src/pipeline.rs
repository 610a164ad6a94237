//! Fetch, group, merge and transform in one call.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use tracing::{debug, instrument};

use downloads_core::{
    Grouping, MergedTable, MetricMode, PackageDownloads, PackageSeries, Result, TimeRange,
    TrimPolicy, merge_at,
};

use crate::fetcher::CachedFetcher;

/// What to chart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartQuery {
    /// Package names, in legend order.
    pub packages: Vec<String>,
    /// Time range.
    pub range: TimeRange,
    /// Bucket size.
    pub grouping: Grouping,
    /// Value presentation.
    pub metric: MetricMode,
    /// Whether the in-progress trailing period is dropped.
    pub trim: TrimPolicy,
}

impl ChartQuery {
    /// Creates a query for `packages` with default range, grouping, metric and trim.
    ///
    /// Repeated names are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: unique_packages(packages.into_iter().map(Into::into)),
            ..Default::default()
        }
    }

    /// Sets the time range.
    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the grouping.
    #[must_use]
    pub const fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the metric mode.
    #[must_use]
    pub const fn with_metric(mut self, metric: MetricMode) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the trim policy.
    #[must_use]
    pub const fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }
}

/// Output of [`ChartPipeline::run`], ready for a renderer.
#[derive(Clone, Debug)]
pub struct ChartData {
    /// Merged, trimmed and transformed table.
    pub table: MergedTable,
    /// Package names, in legend order.
    pub packages: Vec<String>,
    /// Total downloads per package over the fetched range, aligned with `packages`.
    pub totals: Vec<u64>,
    /// The metric actually applied after the single-package fallback.
    pub metric: MetricMode,
}

/// Shared aggregation path for every chart surface.
#[derive(Clone, Debug)]
pub struct ChartPipeline {
    fetcher: CachedFetcher,
}

impl ChartPipeline {
    /// Creates a pipeline over `fetcher`.
    #[must_use]
    pub const fn new(fetcher: CachedFetcher) -> Self {
        Self { fetcher }
    }

    /// The underlying fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    /// Runs the query with today's UTC date.
    pub async fn run(&self, query: &ChartQuery) -> Result<ChartData> {
        self.run_at(query, Utc::now().date_naive()).await
    }

    /// Runs the query with ranges and trimming evaluated against `today`.
    ///
    /// # Errors
    /// Any fetch failure fails the whole run.
    #[instrument(skip(self, query), fields(packages = ?query.packages, grouping = %query.grouping))]
    pub async fn run_at(&self, query: &ChartQuery, today: NaiveDate) -> Result<ChartData> {
        let fetched = self
            .fetcher
            .fetch_all_at(&query.packages, &query.range, today)
            .await?;
        let data = aggregate(fetched, query, today)?;
        debug!(rows = data.table.len(), metric = %data.metric, "Chart data ready");
        Ok(data)
    }
}

/// Keeps the first occurrence of each package name, preserving order.
pub(crate) fn unique_packages(packages: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    packages
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Groups, merges and transforms already-fetched downloads.
///
/// `fetched[i]` holds the downloads of `query.packages[i]`; series are keyed by the
/// requested name whatever name the registry echoed back.
pub fn aggregate(
    fetched: Vec<PackageDownloads>,
    query: &ChartQuery,
    today: NaiveDate,
) -> Result<ChartData> {
    let totals = fetched.iter().map(PackageDownloads::total).collect();
    let series: Vec<PackageSeries> = fetched
        .iter()
        .zip(&query.packages)
        .map(|(d, name)| PackageSeries::new(name.as_str(), query.grouping.group(&d.downloads)))
        .collect();

    let table = merge_at(&series, query.grouping, query.trim, today);
    let metric = query.metric.effective_for(query.packages.len());
    let table = metric.transform(table, &query.packages)?;

    Ok(ChartData {
        table,
        packages: query.packages.clone(),
        totals,
        metric,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use downloads_cache::InMemoryCache;
    use downloads_core::{DownloadSample, DownloadsError};

    use crate::{
        config::FetcherConfig,
        fetcher::tests::{FakeRegistry, day},
    };

    fn pipeline() -> ChartPipeline {
        ChartPipeline::new(CachedFetcher::new(
            Arc::new(FakeRegistry::default()),
            Arc::new(InMemoryCache::new()),
            FetcherConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_weekly_single_package() {
        // 2024-01-01..14 at 10/day; Jan 16 falls in the Jan 14 bucket, which is dropped
        let query = ChartQuery::new(["react"]);
        let data = pipeline().run_at(&query, day(2024, 1, 16)).await.unwrap();

        assert_eq!(data.table.len(), 2);
        assert_eq!(data.table.rows()[0].period_key, day(2023, 12, 31));
        assert_eq!(data.table.rows()[0].value("react"), Some(60.0));
        assert_eq!(data.table.rows()[1].value("react"), Some(70.0));
        assert_eq!(data.totals, vec![140]);
    }

    #[tokio::test]
    async fn test_current_week_is_trimmed() {
        let query = ChartQuery::new(["react"]);
        let data = pipeline().run_at(&query, day(2024, 1, 14)).await.unwrap();
        // Jan 14 starts a new week: Dec 31 (60), Jan 7 (70), Jan 14 (10) -> last dropped
        assert_eq!(data.table.len(), 2);

        let kept = pipeline()
            .run_at(&query.clone().with_trim(TrimPolicy::KeepAll), day(2024, 1, 14))
            .await
            .unwrap();
        assert_eq!(kept.table.len(), 3);
    }

    #[tokio::test]
    async fn test_share_for_two_packages() {
        let query = ChartQuery::new(["react", "vue"])
            .with_grouping(Grouping::Month)
            .with_metric(MetricMode::Share);
        let data = pipeline().run_at(&query, day(2024, 6, 1)).await.unwrap();

        assert_eq!(data.metric, MetricMode::Share);
        let row = &data.table.rows()[0];
        assert_eq!(row.value("react"), Some(50.0));
        assert_eq!(row.value("vue"), Some(50.0));
    }

    #[tokio::test]
    async fn test_share_falls_back_for_one_package() {
        let query = ChartQuery::new(["react"]).with_metric(MetricMode::Share);
        let data = pipeline().run_at(&query, day(2024, 6, 1)).await.unwrap();
        assert_eq!(data.metric, MetricMode::Absolute);
    }

    #[test]
    fn test_repeated_packages_are_dropped() {
        let query = ChartQuery::new(["react", "vue", "react"]);
        assert_eq!(query.packages, vec!["react", "vue"]);
    }

    #[tokio::test]
    async fn test_repeated_package_with_share_falls_back() {
        let query = ChartQuery::new(["react", "react"]).with_metric(MetricMode::Share);
        let data = pipeline().run_at(&query, day(2024, 6, 1)).await.unwrap();
        assert_eq!(data.metric, MetricMode::Absolute);
        assert_eq!(data.packages, vec!["react"]);
    }

    #[test]
    fn test_series_keyed_by_requested_name() {
        let start = day(2024, 1, 1);
        let fetched = vec![PackageDownloads {
            start,
            end: day(2024, 1, 7),
            package: "React".to_string(),
            downloads: (0..7)
                .map(|i| DownloadSample::new(start + chrono::Days::new(i), 5))
                .collect(),
        }];
        let query = ChartQuery::new(["react"]).with_trim(TrimPolicy::KeepAll);

        let data = aggregate(fetched, &query, day(2024, 6, 1)).unwrap();
        let row = &data.table.rows()[0];
        assert_eq!(row.value("react"), Some(30.0));
        assert_eq!(row.value("React"), None);
    }

    #[tokio::test]
    async fn test_failed_package_fails_run() {
        let query = ChartQuery::new(["react", "missing"]);
        let result = pipeline().run_at(&query, day(2024, 6, 1)).await;
        assert!(matches!(result, Err(DownloadsError::Upstream { .. })));
    }
}
