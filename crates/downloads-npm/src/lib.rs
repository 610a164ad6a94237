#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/npmbet/downloads/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! npm registry data provider.
//!
//! This crate provides an npm registry provider that implements the
//! [`RegistryProvider`] trait from `downloads-core`.
//!
//! # Features
//!
//! - Fetch daily download counts using the download-range API
//! - Package search for autocomplete
//! - Explicit request timeout (10 seconds by default)
//! - No retries: failures surface directly to the caller
//!
//! # Example
//!
//! ```no_run
//! use downloads_npm::NpmProvider;
//! use downloads_core::RegistryProvider;
//!
//! # async fn example() -> downloads_core::Result<()> {
//! let provider = NpmProvider::new();
//! let data = provider.fetch_downloads("react", "last-month").await?;
//! println!("Fetched {} days", data.downloads.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use downloads_core::{DownloadsError, PackageDownloads, RegistryProvider, Result, SearchResults};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// npm download counts API base URL.
const API_URL: &str = "https://api.npmjs.org";

/// npm registry base URL (search).
const REGISTRY_URL: &str = "https://registry.npmjs.com";

/// Default upstream request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// npm registry provider.
///
/// Implements [`RegistryProvider`].
#[derive(Debug, Clone)]
pub struct NpmProvider {
    client: reqwest::Client,
    api_url: String,
    registry_url: String,
}

impl NpmProvider {
    /// Create a new npm provider with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new npm provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: API_URL.to_string(),
            registry_url: REGISTRY_URL.to_string(),
        }
    }

    /// Create a new npm provider whose requests time out after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self::with_client(client)
    }

    /// Points the provider at different hosts, e.g. a registry mirror.
    #[must_use]
    pub fn with_base_urls(mut self, api_url: impl Into<String>, registry_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self.registry_url = registry_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the download-range URL for a package.
    fn build_downloads_url(&self, package: &str, api_range: &str) -> String {
        format!("{}/downloads/range/{}/{}", self.api_url, api_range, package)
    }

    /// Build the search URL (query parameters are attached by the request builder).
    fn build_search_url(&self) -> String {
        format!("{}/-/v1/search", self.registry_url)
    }

    /// Send a GET request and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let response = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| DownloadsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadsError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DownloadsError::Parse(e.to_string()))
    }
}

impl Default for NpmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryProvider for NpmProvider {
    fn name(&self) -> &str {
        "npm"
    }

    #[instrument(skip(self), fields(package = %package, range = %api_range))]
    async fn fetch_downloads(&self, package: &str, api_range: &str) -> Result<PackageDownloads> {
        let url = self.build_downloads_url(package, api_range);
        debug!("Fetching downloads: {}", url);

        self.get_json(self.client.get(&url), &url).await
    }

    #[instrument(skip(self), fields(text = %text))]
    async fn search(&self, text: &str, size: usize) -> Result<SearchResults> {
        let url = self.build_search_url();
        debug!("Searching packages: {}", url);

        let request = self
            .client
            .get(&url)
            .query(&[("text", text.to_string()), ("size", size.to_string())]);

        self.get_json(request, &url).await
    }
}
