//! Multi-series merge and trailing-period trimming.
//!
//! [`merge_at`] aligns several bucketed series onto the union of their period keys and
//! optionally drops the last row when it is the still-running period.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::{grouping::Grouping, types::PackageSeries};

/// Whether the trailing, still-in-progress period is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrimPolicy {
    /// Drop the last row if it covers today.
    #[default]
    RemoveCurrentPeriod,
    /// Keep every row.
    KeepAll,
}

impl From<bool> for TrimPolicy {
    fn from(remove_current_period: bool) -> Self {
        if remove_current_period {
            Self::RemoveCurrentPeriod
        } else {
            Self::KeepAll
        }
    }
}

/// One aligned period across all packages.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRow {
    /// First day of the period.
    #[serde(rename = "date")]
    pub period_key: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Value per package; packages without a bucket for this period have no entry.
    pub values: BTreeMap<String, f64>,
}

impl MergedRow {
    /// Returns the value for a package, if present in this period.
    #[must_use]
    pub fn value(&self, package: &str) -> Option<f64> {
        self.values.get(package).copied()
    }
}

/// Merged rows sorted by period key ascending.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergedTable {
    grouping: Grouping,
    rows: Vec<MergedRow>,
}

impl MergedTable {
    /// Creates a table from rows already sorted by period key.
    #[must_use]
    pub const fn from_rows(grouping: Grouping, rows: Vec<MergedRow>) -> Self {
        Self { grouping, rows }
    }

    /// Grouping the rows were bucketed with.
    #[must_use]
    pub const fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// Mutable access to the rows, for in-place transforms.
    pub fn rows_mut(&mut self) -> &mut [MergedRow] {
        &mut self.rows
    }

    /// Consumes the table and returns the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<MergedRow> {
        self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest value across all rows and packages, or `0.0` for an empty table.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| row.values.values().copied())
            .fold(0.0, f64::max)
    }

    /// Sum of a package's values across all rows.
    #[must_use]
    pub fn package_total(&self, package: &str) -> f64 {
        self.rows.iter().filter_map(|row| row.value(package)).sum()
    }
}

/// Merges bucketed series using the current UTC date as "today".
#[must_use]
pub fn merge(series: &[PackageSeries], grouping: Grouping, policy: TrimPolicy) -> MergedTable {
    merge_at(series, grouping, policy, Utc::now().date_naive())
}

/// Merges bucketed series onto the union of their period keys.
///
/// Every `(package, period)` pair from the input appears in exactly one row. With
/// [`TrimPolicy::RemoveCurrentPeriod`], a table of more than one row loses its last row
/// when that row's period contains `today`, using the same boundaries as grouping.
#[must_use]
pub fn merge_at(
    series: &[PackageSeries],
    grouping: Grouping,
    policy: TrimPolicy,
    today: NaiveDate,
) -> MergedTable {
    let mut by_period: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

    for s in series {
        for point in &s.points {
            by_period
                .entry(point.period_key)
                .or_default()
                .insert(s.package_name.clone(), point.downloads as f64);
        }
    }

    let mut rows: Vec<MergedRow> = by_period
        .into_iter()
        .map(|(period_key, values)| MergedRow {
            period_key,
            period_end: grouping.period_end(period_key),
            values,
        })
        .collect();

    let trim = policy == TrimPolicy::RemoveCurrentPeriod
        && rows.len() > 1
        && rows
            .last()
            .is_some_and(|last| grouping.same_period(last.period_key, today));
    if trim {
        if let Some(last) = rows.pop() {
            debug!(period = %last.period_key, %grouping, "Dropped incomplete trailing period");
        }
    }

    MergedTable::from_rows(grouping, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BucketedPoint, DownloadSample};
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(name: &str, points: &[(NaiveDate, u64)]) -> PackageSeries {
        PackageSeries::new(
            name,
            points
                .iter()
                .map(|&(d, v)| BucketedPoint::new(d, v))
                .collect(),
        )
    }

    #[test]
    fn test_two_package_union() {
        let p1 = date(2024, 1, 7);
        let p2 = date(2024, 1, 14);
        let p3 = date(2024, 1, 21);
        let a = series("a", &[(p1, 100), (p2, 200)]);
        let b = series("b", &[(p1, 50), (p3, 10)]);

        let table = merge_at(&[a, b], Grouping::Week, TrimPolicy::KeepAll, date(2024, 6, 1));
        let rows = table.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].period_key, p1);
        assert_eq!(rows[0].value("a"), Some(100.0));
        assert_eq!(rows[0].value("b"), Some(50.0));
        assert_eq!(rows[1].values.len(), 1);
        assert_eq!(rows[1].value("a"), Some(200.0));
        assert_eq!(rows[1].value("b"), None);
        assert_eq!(rows[2].values.len(), 1);
        assert_eq!(rows[2].value("b"), Some(10.0));
        assert_eq!(rows[2].period_end, date(2024, 1, 27));
    }

    #[test]
    fn test_merge_completeness() {
        let a = series("a", &[(date(2024, 1, 1), 1), (date(2024, 3, 1), 3)]);
        let b = series("b", &[(date(2024, 2, 1), 2), (date(2024, 3, 1), 4)]);
        let inputs = [a, b];

        let table = merge_at(&inputs, Grouping::Month, TrimPolicy::KeepAll, date(2030, 1, 1));

        for s in &inputs {
            for point in &s.points {
                let matches: Vec<_> = table
                    .rows()
                    .iter()
                    .filter(|row| row.period_key == point.period_key)
                    .collect();
                assert_eq!(matches.len(), 1);
                assert_eq!(
                    matches[0].value(&s.package_name),
                    Some(point.downloads as f64)
                );
            }
        }
        assert!(table.rows().windows(2).all(|w| w[0].period_key < w[1].period_key));
    }

    #[test]
    fn test_trim_current_week_only() {
        let today = date(2024, 3, 13); // Wednesday, week starts 2024-03-10
        let s = series(
            "a",
            &[
                (date(2024, 2, 25), 1),
                (date(2024, 3, 3), 2),
                (date(2024, 3, 10), 3),
            ],
        );

        let table = merge_at(&[s], Grouping::Week, TrimPolicy::RemoveCurrentPeriod, today);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].period_key, date(2024, 3, 3));
    }

    #[test]
    fn test_trim_keeps_completed_periods() {
        let today = date(2024, 3, 13);
        let s = series("a", &[(date(2024, 2, 25), 1), (date(2024, 3, 3), 2)]);

        let table = merge_at(&[s], Grouping::Week, TrimPolicy::RemoveCurrentPeriod, today);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_trim_day_and_month() {
        let today = date(2024, 3, 13);

        let daily = series("a", &[(date(2024, 3, 12), 1), (today, 2)]);
        let table = merge_at(&[daily], Grouping::Day, TrimPolicy::RemoveCurrentPeriod, today);
        assert_eq!(table.len(), 1);

        let monthly = series("a", &[(date(2024, 2, 1), 1), (date(2024, 3, 1), 2)]);
        let table = merge_at(&[monthly], Grouping::Month, TrimPolicy::RemoveCurrentPeriod, today);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].period_key, date(2024, 2, 1));
    }

    #[test]
    fn test_trim_never_empties_single_row() {
        let today = date(2024, 3, 13);
        let s = series("a", &[(date(2024, 3, 10), 5)]);

        let table = merge_at(&[s], Grouping::Week, TrimPolicy::RemoveCurrentPeriod, today);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_single_package_weekly_scenario() {
        // 14 days of 10/day starting Sunday 2024-03-03; today is mid second week
        let start = date(2024, 3, 3);
        let samples: Vec<_> = (0..14)
            .map(|i| DownloadSample::new(start + Days::new(i), 10))
            .collect();
        let points = Grouping::Week.group(&samples);
        assert_eq!(points.len(), 2);

        let today = date(2024, 3, 13);
        let s = PackageSeries::new("a", points);
        let table = merge_at(&[s], Grouping::Week, TrimPolicy::RemoveCurrentPeriod, today);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].period_key, start);
        assert_eq!(table.rows()[0].value("a"), Some(70.0));
    }

    #[test]
    fn test_empty_input() {
        let table = merge_at(&[], Grouping::Day, TrimPolicy::RemoveCurrentPeriod, date(2024, 1, 1));
        assert!(table.is_empty());
        assert_eq!(table.max_value(), 0.0);
    }

    #[test]
    fn test_totals_and_max() {
        let a = series("a", &[(date(2024, 1, 1), 4), (date(2024, 1, 2), 9)]);
        let b = series("b", &[(date(2024, 1, 2), 11)]);
        let table = merge_at(&[a, b], Grouping::Day, TrimPolicy::KeepAll, date(2024, 1, 2));

        assert_eq!(table.max_value(), 11.0);
        assert_eq!(table.package_total("a"), 13.0);
        assert_eq!(table.package_total("missing"), 0.0);
    }

    #[test]
    fn test_serializes_for_interactive_chart() {
        let a = series("a", &[(date(2024, 1, 7), 3)]);
        let table = merge_at(&[a], Grouping::Week, TrimPolicy::KeepAll, date(2024, 6, 1));
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["grouping"], "week");
        assert_eq!(json["rows"][0]["date"], "2024-01-07");
        assert_eq!(json["rows"][0]["periodEnd"], "2024-01-13");
        assert_eq!(json["rows"][0]["values"]["a"], 3.0);
    }
}
