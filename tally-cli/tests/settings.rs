//! Tests for the settings and expand-state files.

use tally_cli::error::SettingsError;
use tally_cli::settings::{Settings, load_expand_state, save_expand_state};
use tally_grid::accounts::TreeMode;
use tally_grid::{ExpandState, RowKey, SortOn};
use tempfile::TempDir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.width, 80);
    assert!(settings.persist_expand_state);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config").join("tally").join("settings.json");
    let settings = Settings {
        mode: TreeMode::Institution,
        sort: Some(SortOn::descending("balance")),
        hide_closed: true,
        ..Default::default()
    };

    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), settings);
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"mode": "account-type", "width": 100}"#).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.mode, TreeMode::AccountType);
    assert_eq!(settings.width, 100);
    assert!(settings.persist_expand_state);
    assert_eq!(settings.sort, None);
}

#[test]
fn test_invalid_json_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let error = Settings::load(&path).unwrap_err();
    assert!(matches!(error, SettingsError::Json { .. }));
    assert!(error.to_string().contains("settings.json"));
}

#[test]
fn test_expand_state_persists_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("expand-state.json");
    let group = RowKey::synthetic("kind", "savings");
    let state = ExpandState::new()
        .with(RowKey::from_raw(7), true)
        .with(group, false);

    save_expand_state(&path, &state).unwrap();
    let loaded = load_expand_state(&path).unwrap();

    assert_eq!(loaded, state);
    assert_eq!(loaded.get(group), Some(false));
    assert_eq!(loaded.get(RowKey::from_raw(8)), None);
}

#[test]
fn test_missing_expand_state_is_empty() {
    let dir = TempDir::new().unwrap();
    let loaded = load_expand_state(&dir.path().join("expand-state.json")).unwrap();
    assert!(loaded.is_empty());
}
