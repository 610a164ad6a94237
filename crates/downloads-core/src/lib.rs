#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/npmbet/downloads/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for package download statistics.
//!
//! This crate provides the foundational abstractions and the aggregation pipeline:
//!
//! - [`RegistryProvider`](provider::RegistryProvider) - Upstream registry client trait
//! - [`DownloadCache`](cache::DownloadCache) - Key-value cache with expiry
//! - [`Grouping`](grouping::Grouping) - Day/week/month bucketing
//! - [`merge_at`](merge::merge_at) - Multi-series alignment and trailing-period trim
//! - [`MetricMode`](metric::MetricMode) - Absolute counts or percentage share

/// Cache trait and key helpers.
pub mod cache;
/// Error types for download statistics operations.
pub mod error;
/// DataFrame export of merged tables.
pub mod frame;
/// Period grouping and bucket arithmetic.
pub mod grouping;
/// Multi-series merge and trim.
pub mod merge;
/// Post-merge metric transforms.
pub mod metric;
/// Registry provider trait.
pub mod provider;
/// Time ranges and their registry string form.
pub mod range;
/// Core data types.
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{DEFAULT_CACHE_TTL, DownloadCache};
pub use error::{DownloadsError, Result};
pub use grouping::Grouping;
pub use merge::{MergedRow, MergedTable, TrimPolicy, merge, merge_at};
pub use metric::MetricMode;
pub use provider::{DEFAULT_SEARCH_SIZE, RegistryProvider};
pub use range::{NamedRange, TimeRange, registry_epoch};
pub use types::{
    BucketedPoint, DownloadSample, PackageDownloads, PackageInfo, PackageLinks, PackageSeries,
    SearchHit, SearchResults, SearchScore,
};
