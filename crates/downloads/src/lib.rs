#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/npmbet/downloads/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Download statistics for npm packages.
//!
//! This crate re-exports the core types, the cache backends, the npm provider and the
//! chart renderers, and wires them together:
//!
//! - [`CachedFetcher`] - Cache-aside registry access with concurrent multi-package fetch
//! - [`ChartPipeline`] - Fetch, group, merge/trim and metric transform
//! - [`render_chart`] - Static SVG chart and preview card responses
//!
//! # Features
//!
//! - `cache-sqlite` - SQLite-based caching (default)

// Core types and traits
pub use downloads_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use downloads_cache::SqliteCache;
pub use downloads_cache::{InMemoryCache, NoopCache};

// Provider
pub use downloads_npm::NpmProvider;

// Rendering
pub use downloads_chart::{PlaceholderTone, PreviewCard, SvgChart, placeholder_svg, synthesize};

mod config;
mod fetcher;
mod pipeline;
mod render;

pub use config::{DEFAULT_REQUEST_TIMEOUT, ENV_VAR, ExecutionMode, FetcherConfig};
pub use fetcher::CachedFetcher;
pub use pipeline::{ChartData, ChartPipeline, ChartQuery, aggregate};
pub use render::{
    CACHE_CONTROL, ChartKind, ChartResponse, MAX_CARD_PACKAGES, SVG_CONTENT_TYPE,
    StaticChartRequest, render_chart,
};
