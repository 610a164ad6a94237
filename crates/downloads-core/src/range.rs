//! Time range definitions and their registry string form.
//!
//! A [`TimeRange`] is either a [`NamedRange`] keyword or an explicit inclusive pair of
//! dates. Keywords the registry understands natively are passed through verbatim; the
//! others are resolved against "today" into a `YYYY-MM-DD:YYYY-MM-DD` string.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DownloadsError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// First day of data served by the npm registry.
#[must_use]
pub fn registry_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Relative time range keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedRange {
    /// The last 7 days.
    LastWeek,
    /// The last 30 days.
    LastMonth,
    /// The last 365 days.
    #[default]
    LastYear,
    /// Two years back from today.
    #[serde(rename = "last-2-years")]
    LastTwoYears,
    /// Five years back from today.
    #[serde(rename = "last-5-years")]
    LastFiveYears,
    /// Everything since the registry epoch.
    AllTime,
}

impl NamedRange {
    /// Returns the query keyword for this range.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LastWeek => "last-week",
            Self::LastMonth => "last-month",
            Self::LastYear => "last-year",
            Self::LastTwoYears => "last-2-years",
            Self::LastFiveYears => "last-5-years",
            Self::AllTime => "all-time",
        }
    }

    /// Returns true if the registry accepts this keyword as-is.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::LastWeek | Self::LastMonth | Self::LastYear)
    }

    /// Resolves a derived range to explicit dates ending `today`.
    ///
    /// Returns `None` for registry-native keywords. Going back whole years from
    /// Feb 29 lands on Feb 28.
    #[must_use]
    pub fn resolve(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = match self {
            Self::LastWeek | Self::LastMonth | Self::LastYear => return None,
            Self::LastTwoYears => years_before(today, 2),
            Self::LastFiveYears => years_before(today, 5),
            Self::AllTime => registry_epoch(),
        };
        Some((start, today))
    }
}

impl fmt::Display for NamedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedRange {
    type Err = DownloadsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last-week" => Ok(Self::LastWeek),
            "last-month" => Ok(Self::LastMonth),
            "last-year" => Ok(Self::LastYear),
            "last-2-years" => Ok(Self::LastTwoYears),
            "last-5-years" => Ok(Self::LastFiveYears),
            "all-time" => Ok(Self::AllTime),
            other => Err(DownloadsError::InvalidParameter(format!(
                "unknown time range: {other}"
            ))),
        }
    }
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(12 * years))
        .unwrap_or_else(registry_epoch)
}

/// A download-count time range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeRange {
    /// A relative keyword.
    Named(NamedRange),
    /// An explicit inclusive date pair.
    Explicit {
        /// First day.
        start: NaiveDate,
        /// Last day.
        end: NaiveDate,
    },
}

impl TimeRange {
    /// Creates an explicit range, rejecting `start > end`.
    pub fn explicit(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DownloadsError::InvalidParameter(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self::Explicit { start, end })
    }

    /// Parses a keyword or a `YYYY-MM-DD:YYYY-MM-DD` pair.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => Self::explicit(parse_date(start)?, parse_date(end)?),
            None => s.parse().map(Self::Named),
        }
    }

    /// Returns the range in the form expected by the registry's download-range endpoint.
    #[must_use]
    pub fn to_api_range(&self, today: NaiveDate) -> String {
        match self {
            Self::Named(named) => match named.resolve(today) {
                Some((start, end)) => format_pair(start, end),
                None => named.as_str().to_string(),
            },
            Self::Explicit { start, end } => format_pair(*start, *end),
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Named(NamedRange::default())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{named}"),
            Self::Explicit { start, end } => write!(f, "{}", format_pair(*start, *end)),
        }
    }
}

impl FromStr for TimeRange {
    type Err = DownloadsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NamedRange> for TimeRange {
    fn from(named: NamedRange) -> Self {
        Self::Named(named)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| DownloadsError::InvalidParameter(format!("invalid date '{s}': {e}")))
}

fn format_pair(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}:{}",
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    )
}
