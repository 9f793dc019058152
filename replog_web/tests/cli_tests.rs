//! Integration tests for the `replog` binary.
//!
//! These tests verify end-to-end behavior including:
//! - CLI help and argument handling
//! - CSV export from a file-backed store
//! - Serverless mode returning without opening a listener
//! - Startup failures on bad configuration

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use replog_core::{EntryFields, EntryStore, JsonFileStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from the caller's environment
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("replog"));
    cmd.current_dir(dir)
        .env_remove("DATABASE_URL")
        .env_remove("PORT")
        .env_remove("VERCEL")
        .env_remove("REPLOG_SERVERLESS")
        .env_remove("REPLOG_STATIC_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a config file pointing the store into `dir`
fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("config.toml");
    let db_path = dir.join("entries.json");
    fs::write(
        &config_path,
        format!("[database]\nurl = \"file:{}\"\n", db_path.display()),
    )
    .expect("Failed to write config");
    config_path
}

fn seed(db_path: &Path) {
    let store = JsonFileStore::open(db_path).expect("Failed to open store");
    for (day, exercise) in [(1, "Bench Press"), (3, "Deadlift")] {
        store
            .create(EntryFields {
                date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                exercise: exercise.into(),
                muscle_group: "Full body".into(),
                sets: 3,
                reps: "5-5-5".into(),
                weight: Some(225.0),
                rpe: Some(8.5),
                notes: None,
            })
            .expect("Failed to seed entry");
    }
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout log web server"));
}

#[test]
fn test_export_to_stdout() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());
    seed(&temp_dir.path().join("entries.json"));

    let output = cli(temp_dir.path())
        .arg("export")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let csv = String::from_utf8(output).expect("CSV is not UTF-8");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two rows: {}", csv);
    assert!(lines[0].starts_with("id,date,exercise"));
    // Newest first
    assert!(lines[1].contains("Deadlift"));
    assert!(lines[2].contains("Bench Press"));
}

#[test]
fn test_export_to_file() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());
    seed(&temp_dir.path().join("entries.json"));
    let out = temp_dir.path().join("export/entries.csv");

    cli(temp_dir.path())
        .arg("export")
        .arg("--config")
        .arg(&config_path)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 2 entries"));

    let reader = csv::Reader::from_path(&out).expect("Failed to read export");
    assert_eq!(reader.into_records().count(), 2);
}

#[test]
fn test_export_empty_store() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());

    cli(temp_dir.path())
        .arg("export")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("id,date,exercise").or(predicate::str::is_empty()));
}

#[test]
fn test_serverless_mode_does_not_listen() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());

    cli(temp_dir.path())
        .arg("serve")
        .arg("--config")
        .arg(&config_path)
        .env("VERCEL", "1")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stderr(predicate::str::contains("Serverless mode"));
}

#[test]
fn test_database_url_flag_overrides_config() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());
    seed(&temp_dir.path().join("entries.json"));

    // The in-memory store starts empty regardless of the configured file
    let output = cli(temp_dir.path())
        .arg("export")
        .arg("--config")
        .arg(&config_path)
        .arg("--database-url")
        .arg("memory:")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let csv = String::from_utf8(output).expect("CSV is not UTF-8");
    assert!(!csv.contains("Deadlift"));
}

#[test]
fn test_unsupported_database_scheme_fails() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());

    cli(temp_dir.path())
        .arg("serve")
        .arg("--config")
        .arg(&config_path)
        .env("DATABASE_URL", "mongodb://localhost/replog")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported database scheme"));
}

#[test]
fn test_corrupt_store_fails_export() {
    let temp_dir = setup_test_dir();
    let config_path = write_config(temp_dir.path());
    fs::write(temp_dir.path().join("entries.json"), "[{broken").unwrap();

    cli(temp_dir.path())
        .arg("export")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}
