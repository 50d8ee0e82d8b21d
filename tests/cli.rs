//! End-to-end tests driving the compiled `hex-validate` binary directly,
//! covering the CLI's exit codes, reporter output, and cache behavior
//! against real temporary git repositories.

use std::process::Command;

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;

fn hex_validate() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("hex-validate"))
}

fn init_repo(dir: &std::path::Path) {
    for args in [
        vec!["init", "-q"],
        vec!["config", "user.email", "t@example.com"],
        vec!["config", "user.name", "t"],
    ] {
        Command::new("git").args(args).current_dir(dir).status().unwrap();
    }
}

#[test]
fn full_scope_on_clean_repo_passes() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("a.rs"), "fn main() {}\n").unwrap();

    hex_validate()
        .current_dir(tmp.path())
        .args(["full", "--scope=full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks:"));
}

#[test]
fn merge_conflict_marker_fails_the_pipeline_and_is_reported_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::write(
        tmp.path().join("a.rs"),
        "fn main() {}\n<<<<<<< HEAD\n=======\n>>>>>>> branch\n",
    )
    .unwrap();
    Command::new("git").args(["add", "a.rs"]).current_dir(tmp.path()).status().unwrap();

    let output = hex_validate()
        .current_dir(tmp.path())
        .args(["fast", "--report=json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = parsed["results"].as_array().unwrap();
    let conflict = results
        .iter()
        .find(|r| r["name"] == "merge-conflict-markers")
        .expect("merge-conflict-markers result present");
    assert_eq!(conflict["status"], "fail");
    assert_eq!(conflict["findings"][0]["line"], 2);
}

#[test]
fn quiet_flag_omits_finding_detail() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("a.rs"), "<<<<<<< HEAD\n").unwrap();
    Command::new("git").args(["add", "a.rs"]).current_dir(tmp.path()).status().unwrap();

    hex_validate()
        .current_dir(tmp.path())
        .args(["fast", "--quiet"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Tasks:"))
        .stdout(predicate::str::contains("merge-conflict-markers").not());
}

#[test]
fn cache_persists_across_runs_under_dot_cache() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/a.ts"), "import x from './ok';\n").unwrap();
    Command::new("git").args(["add", "src/a.ts"]).current_dir(tmp.path()).status().unwrap();

    hex_validate().current_dir(tmp.path()).args(["fast"]).assert().success();
    assert!(tmp.path().join(".cache/forbidden-import.json").exists());

    // Re-running against the unmodified file is still a clean pass.
    hex_validate().current_dir(tmp.path()).args(["fast"]).assert().success();
}

#[test]
fn cache_clear_removes_the_cache_directory() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/a.ts"), "import x from './ok';\n").unwrap();
    Command::new("git").args(["add", "src/a.ts"]).current_dir(tmp.path()).status().unwrap();
    hex_validate().current_dir(tmp.path()).args(["fast"]).assert().success();
    assert!(tmp.path().join(".cache").exists());

    hex_validate().current_dir(tmp.path()).args(["cache", "clear"]).assert().success();
    assert!(!tmp.path().join(".cache").exists());
}

#[test]
fn non_repository_directory_still_runs_full_scope() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.rs"), "fn main() {}\n").unwrap();

    hex_validate()
        .current_dir(tmp.path())
        .args(["full", "--scope=full"])
        .assert()
        .success();
}

#[test]
fn full_scope_scans_the_whole_tree_not_just_staged_changes() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::write(
        tmp.path().join("a.rs"),
        "fn main() {}\n<<<<<<< HEAD\n=======\n>>>>>>> branch\n",
    )
    .unwrap();
    Command::new("git").args(["add", "a.rs"]).current_dir(tmp.path()).status().unwrap();
    Command::new("git").args(["commit", "-q", "-m", "committed with a marker"]).current_dir(tmp.path()).status().unwrap();

    // Nothing is staged or changed relative to HEAD, but the file is still
    // tracked in the working tree, so `--scope=full` must still find it.
    hex_validate()
        .current_dir(tmp.path())
        .args(["full", "--scope=full", "--report=json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("merge-conflict-markers"));
}

#[test]
fn full_scope_in_non_repo_directory_still_finds_findings() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.rs"), "<<<<<<< HEAD\n").unwrap();

    hex_validate()
        .current_dir(tmp.path())
        .args(["full", "--scope=full", "--report=json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("merge-conflict-markers"));
}

#[test]
fn fail_on_warn_flag_aborts_on_a_warn_finding() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/index.ts"), "export * from './a';\n").unwrap();
    Command::new("git").args(["add", "src/index.ts"]).current_dir(tmp.path()).status().unwrap();

    // Without --fail-on-warn the default pipeline's fast stage tolerates a
    // warn-only result and keeps going.
    hex_validate().current_dir(tmp.path()).args(["fast"]).assert().success();

    // With --fail-on-warn the same warn finding aborts the pipeline.
    hex_validate()
        .current_dir(tmp.path())
        .args(["fast", "--fail-on-warn"])
        .assert()
        .failure();
}

#[test]
fn parallel_fast_stage_reports_checks_in_declaration_order() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/index.ts"), "export * from './a';\n").unwrap();
    Command::new("git").args(["add", "src/index.ts"]).current_dir(tmp.path()).status().unwrap();

    let output = hex_validate()
        .current_dir(tmp.path())
        .args(["fast", "--report=json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = parsed["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["stage"] == "fast")
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    // "fast" is a parallel stage declaring merge-conflict-markers before
    // no-barrel-imports; the report must preserve that order regardless of
    // which check actually finished first.
    assert_eq!(names, vec!["merge-conflict-markers", "no-barrel-imports"]);
}

#[test]
fn forbidden_import_check_falls_back_when_ripgrep_is_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    init_repo(tmp.path());
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/a.ts"), "import x from '../internal/secret';\n").unwrap();
    Command::new("git").args(["add", "src/a.ts"]).current_dir(tmp.path()).status().unwrap();

    hex_validate()
        .current_dir(tmp.path())
        .env("PATH", "")
        .args(["fast", "--report=json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("forbidden-import"));
}

#[test]
fn init_command_reports_out_of_scope() {
    let tmp = tempfile::tempdir().unwrap();
    hex_validate()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of scope"));
}
