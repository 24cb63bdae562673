//! Saved defaults and persisted expand/collapse state.
//!
//! Both live in small JSON files. A missing file reads as the default value.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tally_grid::accounts::TreeMode;
use tally_grid::{ExpandState, SortOn};

use crate::error::SettingsError;

/// Defaults applied when the matching flag is not given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: TreeMode,
    pub default_expand: bool,
    pub sort: Option<SortOn>,
    pub width: u16,
    pub height: Option<u32>,
    pub hide_closed: bool,
    pub show_notes: bool,
    pub persist_expand_state: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: TreeMode::default(),
            default_expand: false,
            sort: None,
            width: 80,
            height: None,
            hide_closed: false,
            show_notes: false,
            persist_expand_state: true,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        write_json(path, self)
    }
}

/// Read the persisted expand state, or an empty one if none was saved.
pub fn load_expand_state(path: &Path) -> Result<ExpandState, SettingsError> {
    read_json(path)
}

pub fn save_expand_state(path: &Path, state: &ExpandState) -> Result<(), SettingsError> {
    write_json(path, state)
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, SettingsError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&json).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    let io_error = |source: std::io::Error| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_error)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
