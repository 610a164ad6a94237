//! Fetcher configuration.

use std::{fmt, str::FromStr, time::Duration};

use downloads_core::DEFAULT_CACHE_TTL;

/// Environment variable selecting the [`ExecutionMode`].
pub const ENV_VAR: &str = "DOWNLOADS_ENV";

/// Default upstream request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether the cache is consulted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Cache-aside: read the cache first, write it after a miss.
    #[default]
    Production,
    /// Every request goes to the registry; the cache is neither read nor written.
    Development,
}

impl ExecutionMode {
    /// Returns true when the cache is bypassed.
    #[must_use]
    pub const fn bypasses_cache(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Reads the mode from [`ENV_VAR`], defaulting to production.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(ENV_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = std::convert::Infallible;

    /// `development` and `dev` (any case) select development; anything else is production.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        })
    }
}

/// Settings for [`CachedFetcher`](crate::CachedFetcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Cache behavior.
    pub mode: ExecutionMode,
    /// Lifetime of cached registry responses.
    pub cache_ttl: Duration,
    /// Timeout applied to registry requests.
    pub request_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Production,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FetcherConfig {
    /// Default configuration with the mode taken from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_mode(ExecutionMode::from_env())
    }

    /// Sets the execution mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the registry request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
