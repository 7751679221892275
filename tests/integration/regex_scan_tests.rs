//! Regex-mode class scan tests
//!
//! Each test writes a small Java tree into a temporary directory and runs the
//! public scan entry point over it.

use bigclean::config::Config;
use bigclean::{scan_unused_classes, ScanMode, ScanReport, Scanner};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `(relative path, contents)` pairs under a fresh temporary root
fn java_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (path, contents) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

fn unused(root: &Path) -> Vec<String> {
    let report = scan_unused_classes(root, ScanMode::Regex);
    assert!(!report.is_failed(), "Scan failed: {:?}", report);
    report
        .findings()
        .iter()
        .map(|r| r.original_class.clone())
        .collect()
}

// ============================================================================
// Reference shapes
// ============================================================================

#[test]
fn test_instantiated_class_is_used() {
    let dir = java_tree(&[
        ("demo/Helper.java", "package demo;\n\nclass Helper {}\n"),
        (
            "demo/Main.java",
            "package demo;\n\npublic class Main {\n    void run() {\n        new Helper();\n    }\n}\n",
        ),
    ]);

    let unused = unused(dir.path());
    assert!(!unused.contains(&"demo.Helper".to_string()));
    assert_eq!(unused, vec!["demo.Main"]);
}

#[test]
fn test_wildcard_generic_bound_counts_as_use() {
    let dir = java_tree(&[
        ("shapes/Shape.java", "package shapes;\n\npublic abstract class Shape {}\n"),
        (
            "shapes/Canvas.java",
            "package shapes;\n\nimport java.util.List;\n\npublic class Canvas {\n    void draw(List<? extends Shape> all) {}\n}\n",
        ),
    ]);

    assert_eq!(unused(dir.path()), vec!["shapes.Canvas"]);
}

#[test]
fn test_class_mentioned_nowhere_else_is_unused() {
    let dir = java_tree(&[
        ("app/Orphan.java", "package app;\n\npublic class Orphan {\n    Orphan self;\n}\n"),
        ("app/Widget.java", "package app;\n\npublic class Widget {}\n"),
        (
            "app/Screen.java",
            "package app;\n\npublic class Screen {\n    private Widget widget;\n}\n",
        ),
    ]);

    assert_eq!(unused(dir.path()), vec!["app.Orphan", "app.Screen"]);
}

#[test]
fn test_import_and_static_access() {
    let dir = java_tree(&[
        ("a/Limits.java", "package a;\n\npublic class Limits { public static int MAX = 3; }\n"),
        ("a/Codes.java", "package a;\n\npublic enum Codes { OK }\n"),
        (
            "b/Client.java",
            "package b;\n\nimport a.Codes;\n\npublic class Client {\n    int max = a.Limits.MAX;\n}\n",
        ),
    ]);

    assert_eq!(unused(dir.path()), vec!["b.Client"]);
}

// ============================================================================
// Candidates and naming
// ============================================================================

#[test]
fn test_excluded_suffixes_are_never_reported() {
    let dir = java_tree(&[
        ("svc/OrderController.java", "package svc;\n\npublic class OrderController {\n    OrderStore store;\n}\n"),
        ("svc/OrderStore.java", "package svc;\n\npublic interface OrderStore {}\n"),
        ("svc/OrderStoreImpl.java", "package svc;\n\npublic class OrderStoreImpl {}\n"),
    ]);

    // Both excluded files stay in the universe, so OrderStore counts as used
    assert!(unused(dir.path()).is_empty());
    assert_eq!(
        scan_unused_classes(dir.path(), ScanMode::Regex),
        ScanReport::NoIssues
    );
}

#[test]
fn test_configured_suffix_is_excluded() {
    let dir = java_tree(&[
        ("x/PaymentJob.java", "package x;\n\npublic class PaymentJob {}\n"),
        ("x/Ledger.java", "package x;\n\npublic class Ledger {}\n"),
    ]);

    let mut config = Config::default();
    config.exclusions.file_suffixes.push("Job".to_string());
    let report = Scanner::new(config).scan_unused_classes(dir.path(), ScanMode::Regex);

    let names: Vec<&str> = report
        .findings()
        .iter()
        .map(|r| r.original_class.as_str())
        .collect();
    assert_eq!(names, vec!["x.Ledger"]);
}

#[test]
fn test_qualified_name_from_path_without_package() {
    let dir = java_tree(&[("com/acme/Loose.java", "public class Loose {}\n")]);
    assert_eq!(unused(dir.path()), vec!["com.acme.Loose"]);
}

#[test]
fn test_findings_carry_file_location() {
    let dir = java_tree(&[("p/Alone.java", "package p;\nclass Alone {}\n")]);
    let report = scan_unused_classes(dir.path(), ScanMode::Regex);

    let location = report.findings()[0].location.as_ref().unwrap();
    assert!(location.file.ends_with("p/Alone.java"));
    assert_eq!(location.line, 1);
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_repeated_scans_are_identical() {
    let dir = java_tree(&[
        ("k/One.java", "package k;\npublic class One {}\n"),
        ("k/Two.java", "package k;\npublic class Two { One one; }\n"),
        ("k/Three.java", "package k;\npublic class Three {}\n"),
        ("k/Four.java", "package k;\npublic class Four {}\n"),
    ]);

    let first = scan_unused_classes(dir.path(), ScanMode::Regex);
    let second = scan_unused_classes(dir.path(), ScanMode::Regex);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_missing_root_degrades_to_failed_report() {
    let report = scan_unused_classes(Path::new("/no/such/java/root"), ScanMode::Regex);
    match report {
        ScanReport::Failed { message } => assert!(message.contains("does not exist")),
        other => panic!("Expected failed report, got {:?}", other),
    }
}

#[test]
fn test_non_java_files_ignored() {
    let dir = java_tree(&[
        ("res/notes.txt", "class Notes {}"),
        ("res/Real.java", "package res;\nclass Real {}\n"),
    ]);
    assert_eq!(unused(dir.path()), vec!["res.Real"]);
}

#[test]
fn test_reference_from_non_utf8_file_counts() {
    let dir = java_tree(&[("p/Helper.java", "package p;\n\npublic class Helper {\n    int x;\n}\n")]);
    fs::write(
        dir.path().join("p/User.java"),
        b"package p;\n\n// caf\xE9\npublic class User {\n    void f() {\n        new Helper();\n    }\n}\n",
    )
    .unwrap();

    let names = unused(dir.path());
    assert!(!names.contains(&"p.Helper".to_string()));
    assert_eq!(names, vec!["p.User"]);
}
