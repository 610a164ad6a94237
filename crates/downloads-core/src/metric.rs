//! Post-merge metric transforms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{
    error::{DownloadsError, Result},
    merge::MergedTable,
};

/// How merged values are presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricMode {
    /// Raw download counts.
    #[default]
    Absolute,
    /// Percentage of the combined downloads of all displayed packages.
    Share,
}

impl MetricMode {
    /// Returns the query keyword for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Share => "share",
        }
    }

    /// Falls back to [`MetricMode::Absolute`] when fewer than two packages are shown.
    #[must_use]
    pub const fn effective_for(self, package_count: usize) -> Self {
        match self {
            Self::Share if package_count < 2 => Self::Absolute,
            mode => mode,
        }
    }

    /// Applies this transform to a merged table.
    ///
    /// `Absolute` returns the table unchanged. `Share` replaces each named package's value
    /// with `100 × value / row total`, rounded to one decimal, where the row total sums
    /// the named packages only. Rows whose total is zero yield `0` for every package.
    /// Values of packages outside `packages` are dropped in share mode.
    ///
    /// # Errors
    /// Returns [`DownloadsError::InvalidParameter`] for `Share` with fewer than two
    /// distinct packages.
    pub fn transform(&self, mut table: MergedTable, packages: &[String]) -> Result<MergedTable> {
        if *self == Self::Absolute {
            return Ok(table);
        }

        let names: BTreeSet<&str> = packages.iter().map(String::as_str).collect();
        if names.len() < 2 {
            return Err(DownloadsError::InvalidParameter(
                "share mode requires at least two packages".to_string(),
            ));
        }

        for row in table.rows_mut() {
            row.values.retain(|name, _| names.contains(name.as_str()));
            let total: f64 = row.values.values().sum();
            for value in row.values.values_mut() {
                *value = if total == 0.0 {
                    0.0
                } else {
                    round_one_decimal(100.0 * *value / total)
                };
            }
        }

        Ok(table)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl fmt::Display for MetricMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricMode {
    type Err = DownloadsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(Self::Absolute),
            "share" => Ok(Self::Share),
            other => Err(DownloadsError::InvalidParameter(format!(
                "unknown metric: {other}"
            ))),
        }
    }
}
