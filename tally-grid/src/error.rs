//! Error types

use std::path::PathBuf;

use thiserror::Error;

use crate::key::AccountId;

/// Errors raised while loading account or balance data.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("series dates must be ascending, found {later} after {earlier}")]
    UnsortedDates {
        earlier: chrono::NaiveDate,
        later: chrono::NaiveDate,
    },
    #[error("series for account {account} has {found} values, expected at most {expected}")]
    SeriesTooLong {
        account: AccountId,
        expected: usize,
        found: usize,
    },
}

impl DirectoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
