//! DataFrame export of merged tables.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::{
    error::{DownloadsError, Result},
    merge::MergedTable,
};

impl MergedTable {
    /// Converts the table to a DataFrame.
    ///
    /// Columns: `date` (Date), `period_end` (Date), then one nullable `f64` column per
    /// entry of `packages`, in order. Periods where a package has no bucket are null.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be assembled (e.g. duplicate package names).
    pub fn to_dataframe(&self, packages: &[String]) -> Result<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| DownloadsError::Other("invalid unix epoch".to_string()))?;
        let days = |d: NaiveDate| (d - epoch).num_days() as i32;

        let dates: Vec<i32> = self.rows().iter().map(|r| days(r.period_key)).collect();
        let ends: Vec<i32> = self.rows().iter().map(|r| days(r.period_end)).collect();

        let mut columns = Vec::with_capacity(packages.len() + 2);
        columns.push(
            Column::new("date".into(), dates)
                .cast(&DataType::Date)
                .map_err(|e| DownloadsError::Other(e.to_string()))?,
        );
        columns.push(
            Column::new("period_end".into(), ends)
                .cast(&DataType::Date)
                .map_err(|e| DownloadsError::Other(e.to_string()))?,
        );

        for package in packages {
            let values: Vec<Option<f64>> = self.rows().iter().map(|r| r.value(package)).collect();
            columns.push(Column::new(package.as_str().into(), values));
        }

        DataFrame::new(columns).map_err(|e| DownloadsError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        grouping::Grouping,
        merge::{TrimPolicy, merge_at},
        types::{BucketedPoint, PackageSeries},
    };
    use chrono::NaiveDate;

    #[test]
    fn test_to_dataframe() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let table = merge_at(
            &[
                PackageSeries::new("a", vec![BucketedPoint::new(d1, 4), BucketedPoint::new(d2, 5)]),
                PackageSeries::new("b", vec![BucketedPoint::new(d2, 6)]),
            ],
            Grouping::Month,
            TrimPolicy::KeepAll,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        );

        let df = table
            .to_dataframe(&["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 4);
        let b = df.column("b").unwrap().f64().unwrap();
        assert_eq!(b.get(0), None);
        assert_eq!(b.get(1), Some(6.0));
    }
}
