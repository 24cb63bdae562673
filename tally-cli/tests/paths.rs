//! Tests for log rotation.

use std::fs;

use tally_cli::paths::{LATEST_LOG, MAX_OLD_LOGS, rotate_logs};
use tempfile::TempDir;

fn log_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_rotate_archives_latest_log() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(LATEST_LOG), "previous run").unwrap();

    rotate_logs(dir.path());

    let names = log_names(&dir);
    assert_eq!(names.len(), 1);
    assert_ne!(names[0], LATEST_LOG);
    assert!(names[0].ends_with(".log"));
    let archived = fs::read_to_string(dir.path().join(&names[0])).unwrap();
    assert_eq!(archived, "previous run");
}

#[test]
fn test_rotate_without_latest_log_is_noop() {
    let dir = TempDir::new().unwrap();
    rotate_logs(dir.path());
    assert!(log_names(&dir).is_empty());
}

#[test]
fn test_rotate_does_not_overwrite_same_second_archive() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(LATEST_LOG), "first").unwrap();
    rotate_logs(dir.path());
    fs::write(dir.path().join(LATEST_LOG), "second").unwrap();
    rotate_logs(dir.path());

    let names = log_names(&dir);
    assert_eq!(names.len(), 2);
    let mut contents: Vec<String> = names
        .iter()
        .map(|n| fs::read_to_string(dir.path().join(n)).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["first", "second"]);
}

#[test]
fn test_rotate_prunes_old_archives() {
    let dir = TempDir::new().unwrap();
    for i in 0..MAX_OLD_LOGS + 3 {
        fs::write(dir.path().join(format!("20240101_0000{:02}.log", i)), "old").unwrap();
    }
    fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

    rotate_logs(dir.path());

    let names = log_names(&dir);
    let logs: Vec<_> = names.iter().filter(|n| n.ends_with(".log")).collect();
    assert_eq!(logs.len(), MAX_OLD_LOGS);
    assert!(names.contains(&"notes.txt".to_string()));
    // The oldest names go first.
    assert!(!names.contains(&"20240101_000000.log".to_string()));
}
