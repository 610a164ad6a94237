//! Provider trait for package registries.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{PackageDownloads, SearchResults},
};

/// Default number of hits requested from package search.
pub const DEFAULT_SEARCH_SIZE: usize = 10;

/// A package registry serving daily download counts.
///
/// Implementations perform exactly one upstream request per call and never retry;
/// callers needing resilience wrap the provider.
#[async_trait]
pub trait RegistryProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "npm").
    fn name(&self) -> &str;

    /// Fetches daily downloads for a package.
    ///
    /// `api_range` is a registry keyword (`last-week`, ...) or an explicit
    /// `YYYY-MM-DD:YYYY-MM-DD` pair.
    ///
    /// # Errors
    /// [`DownloadsError::Transport`](crate::DownloadsError::Transport) when the registry
    /// cannot be reached and [`DownloadsError::Upstream`](crate::DownloadsError::Upstream)
    /// on a non-success status.
    async fn fetch_downloads(&self, package: &str, api_range: &str) -> Result<PackageDownloads>;

    /// Searches packages by free text, returning at most `size` hits.
    async fn search(&self, text: &str, size: usize) -> Result<SearchResults>;
}
