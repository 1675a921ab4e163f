//! Integration tests for the convert command

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an isolated config file and no model configured
fn evquery_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("evquery").unwrap();
    cmd.env("EVQUERY_CONFIG", config_dir.path().join("config.yml"))
        .env("EVQUERY_API_KEY", "")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_convert_short_query_is_kept() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir)
        .arg("convert")
        .arg("ab")
        .assert()
        .success()
        .stdout("ab\n")
        .stderr(predicate::str::contains("local rules"));
}

#[test]
fn test_convert_uses_local_rules_without_key() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir)
        .args(["convert", "find", "pdfs", "from", "today"])
        .assert()
        .success()
        .stdout("dm:today *.pdf\n");
}

#[test]
fn test_convert_passes_through_everything_syntax() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir)
        .args(["convert", "ext:pdf;docx dm:thisweek"])
        .assert()
        .success()
        .stdout("ext:pdf;docx dm:thisweek\n");
}

#[test]
fn test_convert_json_format() {
    let config_dir = TempDir::new().unwrap();

    let output = evquery_cmd(&config_dir)
        .args(["--format", "json", "convert", "videos", "over", "1mb"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["query"], "videos over 1mb");
    assert_eq!(json["everything_query"], "size:>1mb *.mp4;*.avi;*.mkv;*.mov");
    assert_eq!(json["via"], "local");
}

#[test]
fn test_convert_blank_query_fails() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir)
        .args(["convert", "   "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Local optimizer failed"));
}

#[test]
fn test_convert_requires_query() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir).arg("convert").assert().failure();
}

#[test]
fn test_convert_debug_without_model_prints_nothing_extra_to_stdout() {
    let config_dir = TempDir::new().unwrap();

    evquery_cmd(&config_dir)
        .args(["convert", "--debug", "pdf"])
        .assert()
        .success()
        .stdout("*.pdf\n");
}
