//! Period grouping and calendar bucket arithmetic.
//!
//! This module defines [`Grouping`] and the single implementation of bucket
//! boundaries shared by grouping and trailing-period trimming. Weeks always start on
//! Sunday; ISO weeks are not used. Months start on the 1st.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{
    error::DownloadsError,
    types::{BucketedPoint, DownloadSample},
};

/// Bucket size used to aggregate daily download counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// One bucket per calendar day.
    Day,
    /// Sunday-start weeks.
    #[default]
    Week,
    /// Calendar months.
    Month,
}

impl Grouping {
    /// Returns the keyword used in query strings (`day`, `week`, `month`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Returns the canonical first day of the bucket containing `date`.
    #[must_use]
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Days::new(u64::from(date.weekday().num_days_from_sunday())),
            Self::Month => date - Days::new(u64::from(date.day0())),
        }
    }

    /// Returns the last day of the bucket starting at `period_key`.
    ///
    /// `period_key` is expected to already be a bucket start.
    #[must_use]
    pub fn period_end(&self, period_key: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => period_key,
            Self::Week => period_key
                .checked_add_days(Days::new(6))
                .unwrap_or(NaiveDate::MAX),
            Self::Month => period_key
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Returns true if both dates fall into the same bucket.
    #[must_use]
    pub fn same_period(&self, a: NaiveDate, b: NaiveDate) -> bool {
        self.bucket_start(a) == self.bucket_start(b)
    }

    /// Regroups raw daily samples into buckets of this size.
    ///
    /// Day grouping is the identity mapping. Week and month grouping sum the
    /// downloads of every sample sharing a bucket start and return buckets in
    /// ascending order. Missing days are not interpolated.
    #[must_use]
    pub fn group(&self, samples: &[DownloadSample]) -> Vec<BucketedPoint> {
        if *self == Self::Day {
            return samples
                .iter()
                .map(|s| BucketedPoint::new(s.day, s.downloads))
                .collect();
        }

        let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for sample in samples {
            *buckets.entry(self.bucket_start(sample.day)).or_insert(0) += sample.downloads;
        }

        buckets
            .into_iter()
            .map(|(period_key, downloads)| BucketedPoint::new(period_key, downloads))
            .collect()
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = DownloadsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(DownloadsError::InvalidParameter(format!(
                "unknown grouping: {other}"
            ))),
        }
    }
}
