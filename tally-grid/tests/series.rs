//! Tests for balance series loading.

use chrono::NaiveDate;
use tally_grid::accounts::{BalanceSeries, value_at};
use tally_grid::{AccountId, DirectoryError, Snapshot};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

#[test]
fn test_from_json_fills_nulls_with_nan() {
    let json = r#"{
        "dates": ["2024-01-31", "2024-02-29", "2024-03-31"],
        "values": {"1": [10.0, null, 30.0], "2": [5.0]}
    }"#;
    let series = BalanceSeries::from_json(json).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.latest(), Some(Snapshot(2)));

    let first = series.series(AccountId(1)).unwrap();
    assert_eq!(first[0], 10.0);
    assert!(first[1].is_nan());

    // Short series are padded.
    let second = series.series(AccountId(2)).unwrap();
    assert_eq!(second.len(), 3);
    assert!(second[2].is_nan());

    assert!(series.series(AccountId(3)).is_none());
}

#[test]
fn test_snapshot_on_date() {
    let series =
        BalanceSeries::new(vec![date(1, 31), date(2, 29), date(3, 31)], Default::default()).unwrap();
    assert_eq!(series.snapshot_on(date(1, 1)), None);
    assert_eq!(series.snapshot_on(date(1, 31)), Some(Snapshot(0)));
    assert_eq!(series.snapshot_on(date(3, 15)), Some(Snapshot(1)));
    assert_eq!(series.snapshot_on(date(12, 31)), Some(Snapshot(2)));
    assert_eq!(series.date_of(Snapshot(1)), Some(date(2, 29)));
    assert_eq!(series.date_of(Snapshot(3)), None);
}

#[test]
fn test_unsorted_dates_are_rejected() {
    let result = BalanceSeries::new(vec![date(2, 1), date(1, 1)], Default::default());
    assert!(matches!(result, Err(DirectoryError::UnsortedDates { .. })));
}

#[test]
fn test_too_long_series_is_rejected() {
    let json = r#"{"dates": ["2024-01-01"], "values": {"7": [1.0, 2.0]}}"#;
    match BalanceSeries::from_json(json) {
        Err(DirectoryError::SeriesTooLong {
            account,
            expected,
            found,
        }) => {
            assert_eq!(account, AccountId(7));
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("expected SeriesTooLong, got {:?}", other),
    }
}

#[test]
fn test_empty_series() {
    let series = BalanceSeries::from_json("{}").unwrap();
    assert!(series.is_empty());
    assert_eq!(series.latest(), None);
}

#[test]
fn test_value_at_out_of_range_is_nan() {
    assert_eq!(value_at(&[1.0, 2.0], Snapshot(1)), 2.0);
    assert!(value_at(&[1.0, 2.0], Snapshot(2)).is_nan());
}

#[test]
fn test_load_missing_file_reports_path() {
    let error = BalanceSeries::load("/nonexistent/balances.json").unwrap_err();
    assert!(matches!(error, DirectoryError::Io { .. }));
    assert!(error.to_string().contains("/nonexistent/balances.json"));
}
