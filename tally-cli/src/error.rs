//! Error types for the command-line front end.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tally_grid::DirectoryError;

/// Errors raised while reading or writing the settings and state files.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error of the `tally` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("no balances on or before {0}")]
    NoSnapshot(NaiveDate),
    #[error("failed to create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to initialize logging: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
