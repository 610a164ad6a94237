//! Core data types for package download statistics.
//!
//! This module defines the fundamental data structures:
//!
//! - [`DownloadSample`] - One raw per-day observation
//! - [`PackageDownloads`] - A registry download-range payload for one package
//! - [`BucketedPoint`] - One aggregated bucket
//! - [`PackageSeries`] - A package's bucketed series
//! - [`SearchResults`] - Registry package search results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grouping::Grouping;

/// One raw per-day download count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSample {
    /// Calendar day of the observation.
    pub day: NaiveDate,
    /// Downloads recorded on that day.
    pub downloads: u64,
}

impl DownloadSample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(day: NaiveDate, downloads: u64) -> Self {
        Self { day, downloads }
    }
}

/// Daily download counts for one package over a date range, as served by the registry.
///
/// This is also the value stored in the cache for a download-range key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDownloads {
    /// First day covered by the response.
    pub start: NaiveDate,
    /// Last day covered by the response.
    pub end: NaiveDate,
    /// Package name.
    pub package: String,
    /// Per-day samples, ascending by day.
    pub downloads: Vec<DownloadSample>,
}

impl PackageDownloads {
    /// Sum of all daily downloads.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.downloads.iter().map(|s| s.downloads).sum()
    }

    /// Regroups the daily samples into a bucketed series.
    #[must_use]
    pub fn group(&self, grouping: Grouping) -> PackageSeries {
        PackageSeries::new(self.package.clone(), grouping.group(&self.downloads))
    }
}

/// Aggregated downloads for one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedPoint {
    /// First calendar day of the bucket.
    pub period_key: NaiveDate,
    /// Downloads summed over the bucket.
    pub downloads: u64,
}

impl BucketedPoint {
    /// Creates a new bucketed point.
    #[must_use]
    pub const fn new(period_key: NaiveDate, downloads: u64) -> Self {
        Self {
            period_key,
            downloads,
        }
    }
}

/// A package's bucketed series, ordered by period key ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSeries {
    /// Package name.
    pub package_name: String,
    /// Buckets with unique, strictly increasing period keys.
    pub points: Vec<BucketedPoint>,
}

impl PackageSeries {
    /// Creates a new series.
    #[must_use]
    pub fn new(package_name: impl Into<String>, points: Vec<BucketedPoint>) -> Self {
        Self {
            package_name: package_name.into(),
            points,
        }
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of downloads across all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.downloads).sum()
    }
}

/// Package search results from the registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matching packages, best match first.
    pub objects: Vec<SearchHit>,
    /// Total number of matches known to the registry.
    pub total: u64,
}

/// One package search hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Package metadata.
    pub package: PackageInfo,
    /// Relevance score.
    pub score: SearchScore,
}

/// Package metadata returned by search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name.
    pub name: String,
    /// Latest published version.
    pub version: String,
    /// Package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Related links.
    #[serde(default)]
    pub links: PackageLinks,
}

/// Links attached to a search hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageLinks {
    /// Registry page for the package.
    #[serde(default)]
    pub npm: Option<String>,
}

/// Search relevance score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchScore {
    /// Final combined score.
    #[serde(rename = "final")]
    pub final_score: f64,
}
