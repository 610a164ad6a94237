//! Static chart endpoint adapter.
//!
//! Turns query parameters into an image response. Every failure becomes a labeled
//! placeholder image so embedding contexts never show a broken image.

use tracing::{debug, warn};

use downloads_chart::{PLACEHOLDER_SIZE, PlaceholderTone, PreviewCard, SvgChart, placeholder_svg};
use downloads_core::{DownloadsError, Grouping, MetricMode, Result, TimeRange, TrimPolicy};

use crate::pipeline::{ChartPipeline, ChartQuery, unique_packages};

/// Content type of every response body.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Cache-Control header for successful and client-error responses.
pub const CACHE_CONTROL: &str = "public, max-age=3600";

/// Preview cards show at most this many packages.
pub const MAX_CARD_PACKAGES: usize = 5;

const MISSING_PACKAGES: &str = "Please provide package name(s) via ?q=package-name";
const RENDER_FAILED: &str = "Error generating chart";

/// Which image to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartKind {
    /// Embeddable 800px chart.
    #[default]
    Svg,
    /// 1200×628 social preview card.
    Card,
}

/// Raw query parameters of a static chart request.
///
/// Keywords are validated by [`to_query`](Self::to_query), not while reading the pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticChartRequest {
    /// Package names from `q`, trimmed, with empty and repeated entries dropped.
    pub packages: Vec<String>,
    /// `timeRange`.
    pub time_range: Option<String>,
    /// `grouping`.
    pub grouping: Option<String>,
    /// `metric`.
    pub metric: Option<String>,
    /// `removeCurrentPeriod`.
    pub remove_current_period: Option<String>,
}

impl StaticChartRequest {
    /// Reads the recognized parameters from decoded query pairs. Later pairs win.
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "q" => {
                    request.packages = unique_packages(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(str::to_string),
                    );
                }
                "timeRange" => request.time_range = non_empty(value),
                "grouping" => request.grouping = non_empty(value),
                "metric" => request.metric = non_empty(value),
                "removeCurrentPeriod" => request.remove_current_period = non_empty(value),
                _ => {}
            }
        }
        request
    }

    /// Validates the parameters into a pipeline query for `kind`.
    ///
    /// # Errors
    /// Returns [`DownloadsError::InvalidParameter`] when no package is given or a keyword
    /// is not recognized.
    pub fn to_query(&self, kind: ChartKind) -> Result<ChartQuery> {
        if self.packages.is_empty() {
            return Err(DownloadsError::InvalidParameter(MISSING_PACKAGES.to_string()));
        }

        let mut packages = self.packages.clone();
        if kind == ChartKind::Card {
            packages.truncate(MAX_CARD_PACKAGES);
        }

        let range = self
            .time_range
            .as_deref()
            .map(TimeRange::parse)
            .transpose()?
            .unwrap_or_default();
        let grouping: Grouping = self
            .grouping
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let metric: MetricMode = self
            .metric
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let trim = self
            .remove_current_period
            .as_deref()
            .map(parse_flag)
            .transpose()?
            .map_or_else(TrimPolicy::default, TrimPolicy::from);

        Ok(ChartQuery::new(packages)
            .with_range(range)
            .with_grouping(grouping)
            .with_metric(metric)
            .with_trim(trim))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(DownloadsError::InvalidParameter(format!(
            "removeCurrentPeriod must be true or false, got {other}"
        ))),
    }
}

/// An image response, independent of any HTTP framework.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// `Cache-Control` header value, absent for server errors.
    pub cache_control: Option<&'static str>,
    /// SVG document.
    pub body: String,
}

impl ChartResponse {
    fn ok(body: String) -> Self {
        Self {
            status: 200,
            content_type: SVG_CONTENT_TYPE,
            cache_control: Some(CACHE_CONTROL),
            body,
        }
    }

    fn bad_request(body: String) -> Self {
        Self {
            status: 400,
            ..Self::ok(body)
        }
    }

    fn server_error(body: String) -> Self {
        Self {
            status: 500,
            cache_control: None,
            ..Self::ok(body)
        }
    }
}

/// Runs `request` through `pipeline` and renders the result as `kind`.
///
/// Never fails: invalid input yields a 400 placeholder and pipeline or rendering
/// failures a 500 placeholder. A card request without packages yields the
/// brand-only card.
pub async fn render_chart(
    pipeline: &ChartPipeline,
    request: &StaticChartRequest,
    kind: ChartKind,
) -> ChartResponse {
    if kind == ChartKind::Card && request.packages.is_empty() {
        return ChartResponse::ok(PreviewCard::new().brand_only());
    }

    let query = match request.to_query(kind) {
        Ok(query) => query,
        Err(e) => {
            debug!(error = %e, "Rejecting chart request");
            return ChartResponse::bad_request(placeholder(kind, &e.to_string(), PlaceholderTone::Info));
        }
    };

    match render_query(pipeline, &query, kind).await {
        Ok(body) => ChartResponse::ok(body),
        Err(e) if e.is_client_error() => {
            ChartResponse::bad_request(placeholder(kind, &e.to_string(), PlaceholderTone::Info))
        }
        Err(e) => {
            warn!(error = %e, packages = ?query.packages, "Error generating chart");
            let body = match kind {
                ChartKind::Svg => placeholder(kind, RENDER_FAILED, PlaceholderTone::Error),
                ChartKind::Card => PreviewCard::new().fallback(&query.packages),
            };
            ChartResponse::server_error(body)
        }
    }
}

async fn render_query(pipeline: &ChartPipeline, query: &ChartQuery, kind: ChartKind) -> Result<String> {
    let data = pipeline.run(query).await?;
    match kind {
        ChartKind::Svg => SvgChart::new().render(&data.table, &data.packages),
        ChartKind::Card => PreviewCard::new().render(&data.table, &data.packages, &data.totals),
    }
}

fn placeholder(kind: ChartKind, message: &str, tone: PlaceholderTone) -> String {
    let (width, height) = match kind {
        ChartKind::Svg => PLACEHOLDER_SIZE,
        ChartKind::Card => (downloads_chart::CARD_WIDTH, downloads_chart::CARD_HEIGHT),
    };
    placeholder_svg(width, height, message, tone)
}
