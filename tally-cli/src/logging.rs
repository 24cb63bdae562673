//! Log file setup.

use std::fs::{self, File};

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::CliError;
use crate::paths;

/// Route `log` output to `latest.log` in the cache directory.
///
/// Does nothing when the platform has no cache directory.
pub fn init(verbose: bool) -> Result<(), CliError> {
    let (Some(dir), Some(path)) = (paths::cache_dir(), paths::log_file()) else {
        return Ok(());
    };
    fs::create_dir_all(&dir).map_err(|source| CliError::LogFile {
        path: dir.clone(),
        source,
    })?;
    paths::rotate_logs(&dir);

    let file = File::create(&path).map_err(|source| CliError::LogFile {
        path: path.clone(),
        source,
    })?;
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), file)?;
    log::info!("tally {} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}
