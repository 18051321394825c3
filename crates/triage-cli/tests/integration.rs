use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn triage(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.current_dir(dir.path())
        .env("TRIAGE_ROOT", dir.path())
        // Isolate from any user-level ~/.triage/config.yaml
        .env("HOME", dir.path());
    cmd
}

fn write_items(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("items.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

// ---------------------------------------------------------------------------
// triage classify
// ---------------------------------------------------------------------------

#[test]
fn classify_bug_keywords() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["classify", "the app crashes on startup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bug_report"));
}

#[test]
fn classify_ambiguous_lists_candidates() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["classify", "crash in the docs build, maybe a typo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ambiguous"))
        .stdout(predicate::str::contains("bug_report"))
        .stdout(predicate::str::contains("documentation"));
}

#[test]
fn classify_json_output() {
    let dir = TempDir::new().unwrap();
    let output = triage(&dir)
        .args(["classify", "please add support for dark mode", "-j"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"], "single");
    assert_eq!(value["category"], "feature_request");
}

// ---------------------------------------------------------------------------
// triage new
// ---------------------------------------------------------------------------

#[test]
fn new_renders_the_bug_report_example() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args([
            "new",
            "Claude crashes when I use special characters in file paths",
            "--summary",
            "Crash with special characters in file paths",
            "--field",
            "Steps to reproduce=1. Open a file named a&b.txt",
            "--tool-version",
            "2.1.0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[BUG] Crash with special characters in file paths",
        ))
        .stdout(predicate::str::contains("What went wrong?"))
        .stdout(predicate::str::contains("2.1.0"));
}

#[test]
fn new_without_category_fails_on_ambiguous_input() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["new", "crash in the docs build, maybe a typo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--category"));
}

#[test]
fn new_with_category_resolves_ambiguity() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args([
            "new",
            "crash in the docs build, maybe a typo",
            "--category",
            "documentation",
            "--field",
            "What is wrong or missing?=build output is garbled",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DOCS]"));
}

#[test]
fn new_missing_required_field_is_blocked() {
    let dir = TempDir::new().unwrap();
    // Documentation requires "What is wrong or missing?"; only the first
    // required field is seeded from the request text.
    triage(&dir)
        .args(["new", "the readme is unclear about installation"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field"));
}

// ---------------------------------------------------------------------------
// triage plan
// ---------------------------------------------------------------------------

const DISJOINT_ITEMS: &str = r#"
- description: restyle the settings page
  domain_tags: [frontend]
- description: add the settings endpoint
  domain_tags: [backend]
"#;

#[test]
fn plan_planning_mode_holds_locally() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);
    triage(&dir)
        .args(["plan", "--mode", "planning", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("local(2)"));
}

#[test]
fn plan_executing_mode_fans_out() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);
    triage(&dir)
        .args(["plan", "--mode", "executing", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("parallel_delegates(2)"));
}

#[test]
fn plan_request_flags_adjust_the_plan() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);

    // -q forces sequential dispatch even for independent items.
    triage(&dir)
        .args(["plan", "land these changes -q", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 2: single_delegate"))
        .stdout(predicate::str::contains("parallel").not());

    // -p holds everything in the caller's context.
    triage(&dir)
        .args(["plan", "think it through first -p", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("local(2)"));

    // -s requests delegation, overriding the --mode default.
    triage(&dir)
        .args(["plan", "fan this out -s", "--mode", "planning", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("parallel_delegates(2)"));
}

#[test]
fn plan_sequential_dependency_stays_ordered() {
    let dir = TempDir::new().unwrap();
    let items = write_items(
        &dir,
        r#"
- description: write the migration
  domain_tags: [database]
- description: backfill using the migration
  domain_tags: [backend]
  sequential_dependency: true
"#,
    );
    let output = triage(&dir)
        .args(["plan", "--mode", "executing", "-j", "--items"])
        .arg(&items)
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["mode"], "single_delegate");
    assert_eq!(steps[1]["mode"], "single_delegate");
    assert_eq!(
        steps[1]["assignment"]["item"]["description"],
        "backfill using the migration"
    );
}

// ---------------------------------------------------------------------------
// triage run
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn run_dispatches_to_worker_command() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);
    triage(&dir)
        .args(["run", "--worker-cmd", "cat", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("restyle the settings page"));
}

#[test]
fn run_without_worker_cmd_is_a_dry_run() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);
    let output = triage(&dir)
        .args(["run", "-j", "--items"])
        .arg(&items)
        .output()
        .unwrap();
    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for result in results.as_array().unwrap() {
        assert_eq!(result["success"], true);
        assert!(result["output"].as_str().unwrap().contains("dry run"));
    }
}

#[cfg(unix)]
#[test]
fn run_reports_partial_failure_per_item() {
    let dir = TempDir::new().unwrap();
    let items = write_items(&dir, DISJOINT_ITEMS);
    let output = triage(&dir)
        .args(["run", "-j", "--worker-cmd", "false", "--items"])
        .arg(&items)
        .output()
        .unwrap();
    // All workers fail, so the exit code is nonzero, but every item still
    // gets its own recorded result.
    assert!(!output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results.as_array().unwrap().len(), 2);
    for result in results.as_array().unwrap() {
        assert_eq!(result["success"], false);
    }
}

// ---------------------------------------------------------------------------
// triage config
// ---------------------------------------------------------------------------

#[test]
fn config_check_defaults_are_clean() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK"));
}

#[test]
fn config_check_rejects_bad_intent_pattern() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("triage.yaml"),
        r#"
rules:
  - category: bug_report
    keywords: ["boom"]
    intent_patterns: ["(["]
    title_prefix: "[BUG] "
"#,
    )
    .unwrap();

    triage(&dir)
        .args(["config", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid intent pattern"));
}

#[test]
fn project_config_overrides_rules() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("triage.yaml"),
        r#"
rules:
  - category: bug_report
    keywords: ["kaboom"]
    title_prefix: "[BOOM] "
"#,
    )
    .unwrap();

    // Default bug keyword no longer matches; the override does.
    triage(&dir)
        .args(["classify", "total kaboom on startup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bug_report"));
    triage(&dir)
        .args(["classify", "the app crashes on startup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ambiguous"));
}
