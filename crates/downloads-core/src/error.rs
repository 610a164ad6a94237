//! Error types for download statistics operations.
//!
//! This module defines [`DownloadsError`] which covers every failure that can occur
//! while fetching, caching, aggregating or rendering download counts.

use thiserror::Error;

/// Errors that can occur during download statistics operations.
#[derive(Error, Debug)]
pub enum DownloadsError {
    /// The registry could not be reached (connection failure, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The registry answered with a non-success HTTP status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream {
        /// HTTP status code returned by the registry.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// There are no data points to render.
    #[error("No data points to render")]
    EmptyInput,

    /// Error parsing a registry payload or a date.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache backend.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided (unknown keyword, malformed range, ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DownloadsError {
    /// Returns true if the error was caused by the caller's input rather than by
    /// the pipeline or its collaborators.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

/// Result type alias using [`DownloadsError`].
pub type Result<T> = std::result::Result<T, DownloadsError>;
