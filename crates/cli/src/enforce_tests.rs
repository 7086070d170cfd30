// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unit tests for the enforcement orchestrator, driven against throwaway
//! git repositories.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::process::Command;

use tempfile::TempDir;

use super::*;
use crate::config::Config;
use crate::symbols::TsFunctionParser;

// =============================================================================
// TEST HELPERS
// =============================================================================

const ADD_V1: &str = "export function add(a: number, b: number): number {\n  return a + b;\n}\n";
const ADD_V2: &str =
    "export function add(a: number, b: number): number {\n  return b + a;\n}\n";
const ADD_TEST: &str = "describe(\"add\", () => {\n  it(\"adds\", () => {});\n});\n";

fn git(temp: &TempDir, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(temp.path())
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_file(temp: &TempDir, file: &str, content: &str) {
    let path = temp.path().join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn commit_files(temp: &TempDir, message: &str, epoch: i64, files: &[(&str, &str)]) {
    for (file, content) in files {
        write_file(temp, file, content);
        git(temp, &["add", file]);
    }
    let date = format!("{} +0000", epoch);
    let output = Command::new("git")
        .args(["commit", "-m", message])
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .current_dir(temp.path())
        .output()
        .expect("failed to run git commit");
    assert!(output.status.success());
}

/// Repository with `main_files` committed on main and a feature branch
/// checked out, ready for range commits.
fn repo(main_files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    git(&temp, &["init"]);
    git(&temp, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&temp, &["config", "user.email", "test@example.com"]);
    git(&temp, &["config", "user.name", "Test User"]);

    let mut files = vec![("README.md", "# Project\n")];
    files.extend_from_slice(main_files);
    commit_files(&temp, "chore: initial commit", 50, &files);
    git(&temp, &["checkout", "-b", "feature"]);
    temp
}

fn gate_config() -> Config {
    Config {
        base: Some("main".to_string()),
        ..Config::default()
    }
}

fn run_gate(temp: &TempDir, config: &Config, labels: &[&str]) -> EnforcementVerdict {
    let parser = TsFunctionParser;
    let enforcer = Enforcer::new(temp.path(), config, &parser);
    let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
    enforcer.run(&labels).unwrap()
}

// =============================================================================
// BYPASS
// =============================================================================

#[test]
fn skip_label_bypasses_without_touching_git() {
    // Not a git repository at all: a bypassed run must not notice
    let temp = TempDir::new().unwrap();
    let config = gate_config();

    let verdict = run_gate(&temp, &config, &["needs-review", "no-test-needed"]);
    assert!(verdict.bypassed);
    assert!(verdict.passed());
    assert!(verdict.commits.is_empty());
}

#[test]
fn other_labels_do_not_bypass() {
    let temp = repo(&[]);
    let verdict = run_gate(&temp, &gate_config(), &["needs-review"]);
    assert!(!verdict.bypassed);
}

#[test]
fn configured_skip_label_is_respected() {
    let temp = TempDir::new().unwrap();
    let config = Config {
        skip_label: "gate-exempt".to_string(),
        ..gate_config()
    };

    assert!(run_gate(&temp, &config, &["gate-exempt"]).bypassed);
    // The default label no longer bypasses
    let temp = repo(&[]);
    assert!(!run_gate(&temp, &config, &["no-test-needed"]).bypassed);
}

// =============================================================================
// FUNCTION-LEVEL SCENARIOS
// =============================================================================

#[test]
fn changed_function_without_test_file_fails() {
    let temp = repo(&[]);
    commit_files(&temp, "feat: add math", 100, &[("src/math.ts", ADD_V1)]);

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(!verdict.passed());
    assert_eq!(verdict.failures.len(), 1);
    let failure = &verdict.failures[0];
    assert_eq!(failure.function, "add");
    assert_eq!(failure.category, FailureCategory::NoTestFile);
    assert!(failure.test_file.is_none());
}

#[test]
fn stale_test_from_before_the_range_fails() {
    // Test file exists and covers add, but its last change predates the range
    let temp = repo(&[("src/math.ts", ADD_V1), ("src/math.test.ts", ADD_TEST)]);
    commit_files(&temp, "feat: tweak add", 100, &[("src/math.ts", ADD_V2)]);

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert_eq!(verdict.failures.len(), 1);
    assert_eq!(
        verdict.failures[0].category,
        FailureCategory::TestNotUpdated
    );
    assert_eq!(
        verdict.failures[0].test_file.as_deref(),
        Some(std::path::Path::new("src/math.test.ts"))
    );
}

#[test]
fn test_updated_after_the_change_passes() {
    let temp = repo(&[("src/math.ts", ADD_V1), ("src/math.test.ts", ADD_TEST)]);
    commit_files(&temp, "feat: tweak add", 100, &[("src/math.ts", ADD_V2)]);
    commit_files(
        &temp,
        "test: cover the tweak",
        200,
        &[("src/math.test.ts", "describe(\"add\", () => {\n  it(\"adds either way\", () => {});\n});\n")],
    );

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
    assert_eq!(verdict.covered.len(), 1);
    let covered = &verdict.covered[0];
    assert_eq!(covered.function, "add");
    assert_eq!(covered.last_change.message, "feat: tweak add");
    assert_eq!(
        covered.test_updated.as_ref().unwrap().message,
        "test: cover the tweak"
    );
}

#[test]
fn test_updated_in_the_same_commit_passes() {
    let temp = repo(&[("src/math.ts", ADD_V1), ("src/math.test.ts", ADD_TEST)]);
    commit_files(
        &temp,
        "feat: tweak add with tests",
        100,
        &[("src/math.ts", ADD_V2), ("src/math.test.ts", "describe(\"add\", () => {});\n")],
    );

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
    assert_eq!(verdict.covered.len(), 1);
}

#[test]
fn updated_test_without_coverage_fails_as_no_coverage() {
    let temp = repo(&[("src/math.ts", ADD_V1)]);
    commit_files(&temp, "feat: tweak add", 100, &[("src/math.ts", ADD_V2)]);
    commit_files(
        &temp,
        "test: unrelated specs",
        200,
        &[("src/math.test.ts", "describe(\"subtract\", () => {});\n")],
    );

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert_eq!(verdict.failures.len(), 1);
    assert_eq!(verdict.failures[0].category, FailureCategory::NoCoverage);
}

#[test]
fn later_touch_without_test_update_fails() {
    // add changes in C1, tests follow in C2, then add changes again in C3
    let temp = repo(&[("src/math.ts", ADD_V1), ("src/math.test.ts", ADD_TEST)]);
    commit_files(&temp, "feat: tweak add", 100, &[("src/math.ts", ADD_V2)]);
    commit_files(
        &temp,
        "test: cover the tweak",
        200,
        &[("src/math.test.ts", "describe(\"add\", () => { it(\"v2\", () => {}); });\n")],
    );
    commit_files(&temp, "feat: tweak add again", 300, &[("src/math.ts", ADD_V1)]);

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert_eq!(verdict.failures.len(), 1);
    assert_eq!(
        verdict.failures[0].category,
        FailureCategory::TestNotUpdated
    );
    assert_eq!(verdict.failures[0].last_change.message, "feat: tweak add again");
}

#[test]
fn non_exported_changes_are_not_enforced() {
    let with_helper = "export function add(a: number, b: number): number {\n  return helper(a, b);\n}\n\nfunction helper(a: number, b: number): number {\n  return a + b;\n}\n";
    let helper_changed = "export function add(a: number, b: number): number {\n  return helper(a, b);\n}\n\nfunction helper(a: number, b: number): number {\n  return b + a;\n}\n";

    let temp = repo(&[("src/math.ts", with_helper)]);
    commit_files(&temp, "refactor: tweak helper", 100, &[("src/math.ts", helper_changed)]);

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
    assert!(verdict.covered.is_empty());
    assert!(verdict.failures.is_empty());
}

#[test]
fn unparseable_source_contributes_no_functions() {
    let temp = repo(&[]);
    commit_files(&temp, "feat: broken file", 100, &[("src/broken.ts", "export function (((\n")]);

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
    assert!(verdict.failures.is_empty());
}

#[test]
fn excluded_and_non_source_paths_are_ignored() {
    let temp = repo(&[]);
    commit_files(
        &temp,
        "chore: build artifacts",
        100,
        &[
            ("dist/bundle.js", "export function add() { return 1; }\n"),
            ("notes.md", "# notes\n"),
        ],
    );

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
    assert!(verdict.failures.is_empty());
}

#[test]
fn deleted_files_are_out_of_scope() {
    let temp = repo(&[("src/old.ts", ADD_V1)]);
    std::fs::remove_file(temp.path().join("src/old.ts")).unwrap();
    git(&temp, &["add", "src/old.ts"]);
    let date = "100 +0000";
    let output = Command::new("git")
        .args(["commit", "-m", "chore: remove old"])
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.passed());
}

// =============================================================================
// SUITE AND COVERAGE STAGES
// =============================================================================

#[test]
fn suite_stage_runs_only_when_configured() {
    let temp = repo(&[]);
    let verdict = run_gate(&temp, &gate_config(), &[]);
    assert!(verdict.suite.is_none());
    assert!(verdict.suite_passed());
}

#[test]
fn failing_suite_fails_the_verdict() {
    let temp = repo(&[]);
    let mut config = gate_config();
    config.tests.command = Some("echo failing tests; exit 1".to_string());

    let verdict = run_gate(&temp, &config, &[]);
    assert!(!verdict.passed());
    let suite = verdict.suite.as_ref().unwrap();
    assert!(!suite.passed);
    assert!(suite.output.contains("failing tests"));
    // Function stage itself was clean
    assert!(verdict.functions_passed());
}

#[test]
fn passing_suite_keeps_the_verdict_green() {
    let temp = repo(&[]);
    let mut config = gate_config();
    config.tests.command = Some("true".to_string());

    let verdict = run_gate(&temp, &config, &[]);
    assert!(verdict.passed());
    assert!(verdict.suite.as_ref().unwrap().passed);
}

#[test]
fn missing_coverage_report_fails_when_stage_enabled() {
    let temp = repo(&[]);
    let mut config = gate_config();
    config.coverage.check = true;

    let verdict = run_gate(&temp, &config, &[]);
    assert!(!verdict.passed());
    let coverage = verdict.coverage.as_ref().unwrap();
    assert!(!coverage.passed);
    assert!(coverage.message.contains("not found"));
}

#[test]
fn coverage_above_threshold_passes() {
    let temp = repo(&[]);
    let mut config = gate_config();
    config.coverage.check = true;

    let metric = "{\"total\": 100, \"covered\": 90, \"pct\": 90.0}";
    write_file(
        &temp,
        "coverage/coverage-summary.json",
        &format!(
            "{{\"total\": {{\"lines\": {m}, \"statements\": {m}, \"functions\": {m}, \"branches\": {m}}}}}",
            m = metric
        ),
    );

    let verdict = run_gate(&temp, &config, &[]);
    assert!(verdict.passed());
    assert!(verdict.coverage.as_ref().unwrap().passed);
}

#[test]
fn verdict_is_the_conjunction_of_all_stages() {
    // Functions fail while the suite passes: still a failure overall
    let temp = repo(&[]);
    commit_files(&temp, "feat: add math", 100, &[("src/math.ts", ADD_V1)]);
    let mut config = gate_config();
    config.tests.command = Some("true".to_string());

    let verdict = run_gate(&temp, &config, &[]);
    assert!(verdict.suite_passed());
    assert!(!verdict.functions_passed());
    assert!(!verdict.passed());
}
