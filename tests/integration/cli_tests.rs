//! CLI integration tests
//!
//! These tests run the `bigclean` binary against temporary Java trees.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn java_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (path, contents) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

fn sample_tree() -> TempDir {
    java_tree(&[
        ("demo/Helper.java", "package demo;\n\npublic class Helper {\n    int x;\n}\n"),
        (
            "demo/Main.java",
            "package demo;\n\npublic class Main {\n    void run() {\n        new Helper();\n    }\n}\n",
        ),
        ("demo/Orphan.java", "package demo;\n\npublic class Orphan {\n    int y;\n}\n"),
    ])
}

fn bigclean() -> Command {
    Command::cargo_bin("bigclean").expect("Binary not built")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    bigclean()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bigclean"))
        .stdout(predicate::str::contains("--scan"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_cli_version() {
    bigclean()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_invalid_mode_rejected() {
    bigclean()
        .args(["--mode", "bytecode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// Scans
// ============================================================================

#[test]
fn test_cli_regex_class_scan_terminal() {
    let dir = sample_tree();

    bigclean()
        .arg(dir.path())
        .args(["--scan", "classes", "--mode", "regex", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 unused classes"))
        .stdout(predicate::str::contains("demo.Orphan"))
        .stdout(predicate::str::contains("demo.Helper").not());
}

#[test]
fn test_cli_ast_class_scan_json() {
    let dir = sample_tree();

    let output = bigclean()
        .arg(dir.path())
        .args(["--mode", "ast", "--format", "json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "classes");
    assert_eq!(json["report"]["status"], "findings");
    let names: Vec<&str> = json["report"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["original_class"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["demo.Main", "demo.Orphan"]);
}

#[test]
fn test_cli_method_scan_json_to_file() {
    let dir = java_tree(&[(
        "m/Tool.java",
        "package m;\n\npublic class Tool {\n    public void used() {\n    }\n\n    public void start() {\n        used();\n    }\n}\n",
    )]);
    let out = dir.path().join("report.json");

    bigclean()
        .arg(dir.path())
        .args(["--scan", "methods", "--format", "json", "--quiet", "--threads", "2"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["kind"], "methods");
    assert_eq!(json["total"], 1);
    assert_eq!(json["report"]["data"][0]["method"], "start");
}

#[test]
fn test_cli_no_issues() {
    let dir = java_tree(&[("e/Empty.java", "package e;\n\npublic class Empty {}\n")]);

    bigclean()
        .arg(dir.path())
        .args(["--mode", "ast", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unused classes found!"));
}

#[test]
fn test_cli_missing_root_exits_nonzero() {
    bigclean()
        .arg("/no/such/java/root")
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Scan failed"));
}

#[test]
fn test_cli_config_file_extends_exclusions() {
    let dir = sample_tree();
    fs::write(
        dir.path().join(".bigclean.yml"),
        "exclusions:\n  file_suffixes:\n    - Orphan\n",
    )
    .unwrap();

    bigclean()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo.Main"))
        .stdout(predicate::str::contains("demo.Orphan").not());
}
