//! Type curve: average production profile of an operator's wells aligned
//! by months since each well's first production month.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::db::models::WellMonth;

/// Relative months kept in the curve: 0 through 24 inclusive.
pub const DEFAULT_MAX_MONTH: i32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCurvePoint {
    pub relative_month: i32,
    pub mean_oil: f64,
    pub well_count: usize,
}

/// Months elapsed from `birth` to `date`, ignoring the day of month.
pub fn relative_month(birth: NaiveDate, date: NaiveDate) -> i32 {
    (date.year() - birth.year()) * 12 + (date.month() as i32 - birth.month() as i32)
}

/// First production month per well.
pub fn birth_dates(rows: &[WellMonth]) -> FxHashMap<i64, NaiveDate> {
    let mut births: FxHashMap<i64, NaiveDate> = FxHashMap::default();
    for row in rows {
        births
            .entry(row.well_id)
            .and_modify(|d| *d = (*d).min(row.date))
            .or_insert(row.date);
    }
    births
}

#[derive(Default)]
struct Bucket {
    oil_sum: f64,
    rows: usize,
    wells: FxHashSet<i64>,
}

/// Group well-month rows by relative month and average oil across them.
///
/// Output is ascending by relative month and only contains months that
/// have at least one row; months beyond `max_month` are dropped.
pub fn build(rows: &[WellMonth], max_month: i32) -> Vec<TypeCurvePoint> {
    let births = birth_dates(rows);
    let mut buckets: BTreeMap<i32, Bucket> = BTreeMap::new();

    for row in rows {
        let Some(birth) = births.get(&row.well_id) else {
            continue;
        };
        let month = relative_month(*birth, row.date);
        if !(0..=max_month).contains(&month) {
            continue;
        }

        let bucket = buckets.entry(month).or_default();
        bucket.oil_sum += row.oil;
        bucket.rows += 1;
        bucket.wells.insert(row.well_id);
    }

    buckets
        .into_iter()
        .map(|(relative_month, bucket)| TypeCurvePoint {
            relative_month,
            mean_oil: bucket.oil_sum / bucket.rows as f64,
            well_count: bucket.wells.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn row(well_id: i64, date: NaiveDate, oil: f64) -> WellMonth {
        WellMonth { well_id, date, oil }
    }

    #[test]
    fn test_relative_month_crosses_year_boundary() {
        assert_eq!(relative_month(ymd(2023, 11), ymd(2023, 11)), 0);
        assert_eq!(relative_month(ymd(2023, 11), ymd(2024, 2)), 3);
        assert_eq!(relative_month(ymd(2022, 1), ymd(2024, 1)), 24);
    }

    #[test]
    fn test_two_wells_started_apart_align_on_month_zero() {
        let rows = vec![
            row(1, ymd(2023, 1), 100.0),
            row(1, ymd(2023, 2), 80.0),
            row(1, ymd(2023, 3), 60.0),
            row(2, ymd(2023, 7), 200.0),
            row(2, ymd(2023, 8), 160.0),
            row(2, ymd(2023, 9), 120.0),
        ];
        let curve = build(&rows, DEFAULT_MAX_MONTH);

        assert_eq!(
            curve,
            vec![
                TypeCurvePoint { relative_month: 0, mean_oil: 150.0, well_count: 2 },
                TypeCurvePoint { relative_month: 1, mean_oil: 120.0, well_count: 2 },
                TypeCurvePoint { relative_month: 2, mean_oil: 90.0, well_count: 2 },
            ]
        );
    }

    #[test]
    fn test_month_zero_is_each_wells_first_production_date() {
        let rows = vec![
            row(7, ymd(2021, 5), 10.0),
            row(7, ymd(2021, 3), 30.0),
            row(9, ymd(2020, 12), 50.0),
            row(9, ymd(2021, 1), 40.0),
            row(7, ymd(2021, 4), 20.0),
        ];
        let births = birth_dates(&rows);

        for r in &rows {
            let min = rows
                .iter()
                .filter(|o| o.well_id == r.well_id)
                .map(|o| o.date)
                .min()
                .unwrap();
            if relative_month(births[&r.well_id], r.date) == 0 {
                assert_eq!(r.date, min);
            }
        }
        assert_eq!(births[&7], ymd(2021, 3));
        assert_eq!(births[&9], ymd(2020, 12));
    }

    #[test]
    fn test_months_past_limit_are_dropped() {
        let start = ymd(2020, 1);
        let rows: Vec<WellMonth> = (0..30)
            .map(|i| row(1, start.checked_add_months(chrono::Months::new(i)).unwrap(), 1.0))
            .collect();
        let curve = build(&rows, DEFAULT_MAX_MONTH);

        assert_eq!(curve.len(), 25);
        assert_eq!(curve.first().unwrap().relative_month, 0);
        assert_eq!(curve.last().unwrap().relative_month, 24);
    }

    #[test]
    fn test_uneven_well_counts() {
        let rows = vec![
            row(1, ymd(2024, 1), 10.0),
            row(1, ymd(2024, 2), 8.0),
            row(2, ymd(2024, 3), 30.0),
        ];
        let curve = build(&rows, DEFAULT_MAX_MONTH);

        assert_eq!(curve[0].well_count, 2);
        assert_eq!(curve[0].mean_oil, 20.0);
        assert_eq!(curve[1].well_count, 1);
        assert_eq!(curve[1].mean_oil, 8.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(build(&[], DEFAULT_MAX_MONTH).is_empty());
    }
}
