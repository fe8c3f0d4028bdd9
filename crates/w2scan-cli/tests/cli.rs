use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `w2scan` isolated from the user's config, `.env` and API key.
fn w2scan(dir: &Path) -> Command {
    let config = dir.join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }

    let mut cmd = Command::cargo_bin("w2scan").unwrap();
    cmd.current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .arg("--config")
        .arg(&config);
    cmd
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("w2scan")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_get_reads_defaults() {
    let dir = TempDir::new().unwrap();

    w2scan(dir.path())
        .args(["config", "get", "llm.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gemini-1.5-pro\""));

    w2scan(dir.path())
        .args(["config", "get", "llm.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_set_persists() {
    let dir = TempDir::new().unwrap();

    w2scan(dir.path())
        .args(["config", "set", "export.file_prefix", "forms"])
        .assert()
        .success();

    w2scan(dir.path())
        .args(["config", "get", "export.file_prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"forms\""));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();

    w2scan(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    w2scan(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(written.contains("\"api_key_env\": \"GEMINI_API_KEY\""));
}

#[test]
fn process_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    w2scan(dir.path())
        .args(["process", "missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_unreadable_pdf_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.pdf"), b"this is not a pdf").unwrap();

    w2scan(dir.path())
        .args(["process", "broken.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text could be extracted"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();

    w2scan(dir.path())
        .args(["batch", "*.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn batch_reports_skipped_files_and_exports_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pdf"), b"garbage").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
    let out = dir.path().join("out");

    w2scan(dir.path())
        .args(["batch", "*.pdf", "--no-llm", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 PDF files"))
        .stdout(predicate::str::contains("Skipped files (1)"))
        .stdout(predicate::str::contains("a.pdf"))
        .stdout(predicate::str::contains("nothing exported"));

    assert!(!out.exists());
}
