//! Per-account value series indexed by snapshot.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::column::Snapshot;
use crate::error::DirectoryError;
use crate::key::AccountId;

/// Balance history for a set of accounts.
///
/// Every account series has one value per date. Missing values are NaN.
#[derive(Debug, Clone, Default)]
pub struct BalanceSeries {
    dates: Vec<NaiveDate>,
    values: HashMap<AccountId, Arc<[f64]>>,
}

#[derive(Deserialize)]
struct RawSeries {
    #[serde(default)]
    dates: Vec<NaiveDate>,
    #[serde(default)]
    values: HashMap<AccountId, Vec<Option<f64>>>,
}

impl BalanceSeries {
    /// Build a series, validating date order and padding short value lists
    /// with NaN.
    pub fn new(
        dates: Vec<NaiveDate>,
        values: HashMap<AccountId, Vec<Option<f64>>>,
    ) -> Result<Self, DirectoryError> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(DirectoryError::UnsortedDates {
                earlier: pair[0],
                later: pair[1],
            });
        }

        let mut series: HashMap<AccountId, Arc<[f64]>> = HashMap::with_capacity(values.len());
        for (account, raw) in values {
            if raw.len() > dates.len() {
                return Err(DirectoryError::SeriesTooLong {
                    account,
                    expected: dates.len(),
                    found: raw.len(),
                });
            }
            if raw.len() < dates.len() {
                log::warn!(
                    "series for account {} has {} of {} values, padding with NaN",
                    account,
                    raw.len(),
                    dates.len()
                );
            }
            let mut filled: Vec<f64> = raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            filled.resize(dates.len(), f64::NAN);
            series.insert(account, Arc::from(filled));
        }

        Ok(Self {
            dates,
            values: series,
        })
    }

    /// Parse from JSON: `{"dates": [...], "values": {"<id>": [..]}}`.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let raw: RawSeries = serde_json::from_str(json)?;
        Self::new(raw.dates, raw.values)
    }

    /// Read and parse a series file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DirectoryError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The series of one account, if it has any data.
    pub fn series(&self, account: AccountId) -> Option<Arc<[f64]>> {
        self.values.get(&account).cloned()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        self.dates.len().checked_sub(1).map(Snapshot)
    }

    /// The latest snapshot on or before `date`.
    pub fn snapshot_on(&self, date: NaiveDate) -> Option<Snapshot> {
        self.dates
            .partition_point(|d| *d <= date)
            .checked_sub(1)
            .map(Snapshot)
    }

    pub fn date_of(&self, snapshot: Snapshot) -> Option<NaiveDate> {
        self.dates.get(snapshot.index()).copied()
    }
}

/// Value of a series at `snapshot`; NaN when out of range.
pub fn value_at(series: &[f64], snapshot: Snapshot) -> f64 {
    series.get(snapshot.index()).copied().unwrap_or(f64::NAN)
}
