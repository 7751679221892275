//! AST-mode scan tests: unused classes on the parsed model and the unused
//! method report with its propagation, exclusion and ranking rules.

use bigclean::config::Config;
use bigclean::{
    scan_unused_classes, scan_unused_methods, MethodReference, ScanMode, ScanReport, Scanner,
};
use std::fs;
use std::path::Path;
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

fn unused_classes(root: &Path) -> Vec<String> {
    let report = scan_unused_classes(root, ScanMode::Ast);
    assert!(!report.is_failed(), "Scan failed: {:?}", report);
    report
        .findings()
        .iter()
        .map(|r| r.original_class.clone())
        .collect()
}

fn unused_methods(root: &Path) -> Vec<MethodReference> {
    let report = scan_unused_methods(root);
    assert!(!report.is_failed(), "Scan failed: {:?}", report);
    report.findings().to_vec()
}

fn labels(methods: &[MethodReference]) -> Vec<String> {
    methods
        .iter()
        .map(|m| format!("{}#{}", m.original_class(), m.method))
        .collect()
}

/// A method spanning exactly `lines` lines
fn sized_method(name: &str, lines: usize) -> String {
    format!("    void {}() {{{}}}\n", name, "\n".repeat(lines - 1))
}

// ============================================================================
// Unused classes
// ============================================================================

#[test]
fn test_ast_class_references() {
    let dir = java_tree(&[
        ("zoo/Animal.java", "package zoo;\n\npublic interface Animal { String name(); }\n"),
        (
            "zoo/Keeper.java",
            "package zoo;\n\nimport java.util.List;\n\npublic class Keeper {\n    void feed(List<? extends Animal> animals) {}\n}\n",
        ),
        ("zoo/Cage.java", "package zoo;\n\npublic class Cage {\n    int size;\n}\n"),
    ]);

    assert_eq!(unused_classes(dir.path()), vec!["zoo.Cage", "zoo.Keeper"]);
}

#[test]
fn test_beans_and_empty_types_are_not_candidates() {
    let dir = java_tree(&[
        (
            "web/Billing.java",
            "package web;\n\n@Service\npublic class Billing {\n    void charge() {}\n}\n",
        ),
        ("web/Marker.java", "package web;\n\npublic class Marker {}\n"),
        ("web/Stray.java", "package web;\n\npublic class Stray {\n    int x;\n}\n"),
    ]);

    assert_eq!(unused_classes(dir.path()), vec!["web.Stray"]);
}

#[test]
fn test_duplicate_declarations_retry_tolerant() {
    let dir = java_tree(&[
        ("one/Dup.java", "package same;\n\npublic class Dup {\n    int a;\n}\n"),
        ("two/Dup.java", "package same;\n\npublic class Dup {\n    int b;\n}\n"),
        (
            "same/User.java",
            "package same;\n\npublic class User {\n    Dup dup;\n}\n",
        ),
    ]);

    let report = scan_unused_classes(dir.path(), ScanMode::Ast);
    assert!(!report.is_failed());
    let names: Vec<&str> = report
        .findings()
        .iter()
        .map(|r| r.original_class.as_str())
        .collect();

    // References resolve to the first copy, so only the second is unused
    assert_eq!(names, vec!["same.Dup", "same.User"]);
    let dup = report.findings()[0].location.as_ref().unwrap();
    assert!(dup.file.ends_with("two/Dup.java"));
}

#[test]
fn test_reference_from_non_utf8_file_counts() {
    let dir = java_tree(&[("p/Helper.java", "package p;\n\npublic class Helper {\n    int x;\n}\n")]);
    fs::write(
        dir.path().join("p/User.java"),
        b"package p;\n\n// caf\xE9\npublic class User {\n    void f() {\n        new Helper();\n    }\n}\n",
    )
    .unwrap();

    let names = unused_classes(dir.path());
    assert!(!names.contains(&"p.Helper".to_string()));
    assert_eq!(names, vec!["p.User"]);
}

#[test]
fn test_unparseable_file_does_not_abort_scan() {
    let dir = java_tree(&[
        ("p/Broken.java", "package p;\n\npublic class Broken {\n    void x( {\n"),
        ("p/Fine.java", "package p;\n\npublic class Fine {\n    int y;\n}\n"),
    ]);

    let names = unused_classes(dir.path());
    assert!(names.contains(&"p.Fine".to_string()));
}

// ============================================================================
// Unused methods
// ============================================================================

#[test]
fn test_interface_call_marks_implementers_used() {
    let dir = java_tree(&[
        (
            "greet/Greeter.java",
            "package greet;\n\npublic interface Greeter {\n    void greet();\n}\n",
        ),
        (
            "greet/EnglishGreeter.java",
            "package greet;\n\npublic class EnglishGreeter implements Greeter {\n    public void greet() {\n        System.out.println(\"hello\");\n    }\n\n    public void wave() {\n    }\n}\n",
        ),
        (
            "greet/App.java",
            "package greet;\n\npublic class App {\n    void start(Greeter g) {\n        g.greet();\n    }\n}\n",
        ),
    ]);

    let unused = labels(&unused_methods(dir.path()));
    assert!(!unused.contains(&"greet.EnglishGreeter#greet".to_string()));
    assert!(unused.contains(&"greet.EnglishGreeter#wave".to_string()));
    assert!(unused.contains(&"greet.App#start".to_string()));
}

#[test]
fn test_transitive_implementers_are_marked() {
    let dir = java_tree(&[
        ("t/Shape.java", "package t;\n\npublic interface Shape {\n    double area();\n}\n"),
        (
            "t/Polygon.java",
            "package t;\n\npublic abstract class Polygon implements Shape {\n    int sides;\n}\n",
        ),
        (
            "t/Square.java",
            "package t;\n\npublic class Square extends Polygon {\n    public double area() {\n        return 1.0;\n    }\n}\n",
        ),
        (
            "t/Report.java",
            "package t;\n\npublic class Report {\n    double total(Shape s) {\n        return s.area();\n    }\n}\n",
        ),
    ]);

    let unused = labels(&unused_methods(dir.path()));
    assert!(!unused.contains(&"t.Square#area".to_string()));
}

#[test]
fn test_lifecycle_hooks_never_reported() {
    let dir = java_tree(&[(
        "life/Warmup.java",
        "package life;\n\nimport javax.annotation.PostConstruct;\n\npublic class Warmup {\n    @PostConstruct\n    public void init() {\n    }\n\n    public void afterPropertiesSet() {\n    }\n\n    public void idle() {\n    }\n}\n",
    )]);

    assert_eq!(labels(&unused_methods(dir.path())), vec!["life.Warmup#idle"]);
}

#[test]
fn test_controllers_and_interfaces_excluded() {
    let dir = java_tree(&[
        (
            "api/Orders.java",
            "package api;\n\n@RestController\npublic class Orders {\n    public String list() {\n        return \"\";\n    }\n}\n",
        ),
        (
            "api/Port.java",
            "package api;\n\npublic interface Port {\n    void open();\n}\n",
        ),
        (
            "api/Worker.java",
            "package api;\n\npublic class Worker {\n    void unusedWork() {\n    }\n}\n",
        ),
    ]);

    assert_eq!(labels(&unused_methods(dir.path())), vec!["api.Worker#unusedWork"]);
}

#[test]
fn test_method_report_ranked_by_size() {
    let source = format!(
        "package rank;\n\npublic class Sizes {{\n{}{}{}}}\n",
        sized_method("twelve", 12),
        sized_method("fortySeven", 47),
        sized_method("three", 3)
    );
    let dir = java_tree(&[("rank/Sizes.java", source.as_str())]);

    let methods = unused_methods(dir.path());
    let lines: Vec<usize> = methods.iter().map(|m| m.method_lines).collect();
    assert_eq!(lines, vec![47, 12, 3]);
    assert_eq!(methods[0].to_string(), "rank.Sizes#fortySeven (47 lines)");
}

#[test]
fn test_calls_through_fields_and_this() {
    let dir = java_tree(&[
        (
            "svc/Store.java",
            "package svc;\n\npublic class Store {\n    public void save(String s) {\n    }\n\n    public void purge() {\n    }\n}\n",
        ),
        (
            "svc/Flow.java",
            "package svc;\n\npublic class Flow {\n    private Store store;\n\n    public void run() {\n        this.step();\n        store.save(\"x\");\n    }\n\n    private void step() {\n    }\n}\n",
        ),
    ]);

    let unused = labels(&unused_methods(dir.path()));
    assert_eq!(unused, vec!["svc.Flow#run", "svc.Store#purge"]);
}

#[test]
fn test_statically_imported_method_is_used() {
    let dir = java_tree(&[
        (
            "p/Util.java",
            "package p;\n\npublic class Util {\n    public static int twice(int x) {\n        return x * 2;\n    }\n}\n",
        ),
        (
            "p/Main.java",
            "package p;\n\nimport static p.Util.twice;\n\npublic class Main {\n    int main() {\n        return twice(2);\n    }\n}\n",
        ),
        (
            "q/Maths.java",
            "package q;\n\npublic class Maths {\n    public static int square(int x) {\n        return x * x;\n    }\n\n    public static int cube(int x) {\n        return x * x * x;\n    }\n}\n",
        ),
        (
            "q/Area.java",
            "package q;\n\nimport static q.Maths.*;\n\npublic class Area {\n    int of(int side) {\n        return square(side);\n    }\n}\n",
        ),
    ]);

    let unused = labels(&unused_methods(dir.path()));
    assert!(!unused.contains(&"p.Util#twice".to_string()));
    assert!(!unused.contains(&"q.Maths#square".to_string()));
    assert!(unused.contains(&"q.Maths#cube".to_string()));
    assert!(unused.contains(&"p.Main#main".to_string()));
}

#[test]
fn test_method_scan_is_idempotent() {
    let dir = java_tree(&[
        (
            "idem/A.java",
            "package idem;\n\npublic class A {\n    void a1() {\n    }\n    void a2() {\n        b.b1();\n    }\n    B b;\n}\n",
        ),
        ("idem/B.java", "package idem;\n\npublic class B {\n    void b1() {\n    }\n    void b2() {\n    }\n}\n"),
    ]);

    let first = scan_unused_methods(dir.path());
    let second = scan_unused_methods(dir.path());
    assert_eq!(first, second);
}

#[test]
fn test_single_worker_matches_default_pool() {
    let dir = java_tree(&[
        (
            "par/Calc.java",
            "package par;\n\npublic class Calc {\n    int plus(int a, int b) {\n        return a + b;\n    }\n    int minus(int a, int b) {\n        return a - b;\n    }\n}\n",
        ),
        (
            "par/Use.java",
            "package par;\n\npublic class Use {\n    Calc calc;\n    int go() {\n        return calc.plus(1, 2);\n    }\n}\n",
        ),
    ]);

    let mut config = Config::default();
    config.scan.threads = Some(1);
    config.scan.ast_batch_size = 1;
    let single = Scanner::new(config).scan_unused_methods(dir.path());

    assert_eq!(single, scan_unused_methods(dir.path()));
    let names: Vec<String> = labels(single.findings());
    assert_eq!(names, vec!["par.Calc#minus", "par.Use#go"]);
}

#[test]
fn test_empty_tree_reports_no_issues() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(scan_unused_methods(dir.path()), ScanReport::NoIssues);
}
