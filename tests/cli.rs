//! Integration tests for the `task-setup` and `demo-runner` binaries.

use std::path::Path;
use std::process::{Command, Output};

fn run(bin: &str, state: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .current_dir(state)
        .env("CONTEXTCORE_STATE_DIR", state)
        .env("HOME", state)
        .env_remove("CONTEXTCORE_DEMO_CONFIG")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary")
}

fn task_setup(state: &Path, args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_task-setup"), state, args)
}

fn demo_runner(state: &Path, args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_demo-runner"), state, args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn setup_then_dry_run_lists_phase_one_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let setup = task_setup(dir.path(), &["--clean"]);
    assert!(setup.status.success(), "{}", String::from_utf8_lossy(&setup.stderr));
    assert!(dir.path().join("ecosystem-demo").join("DEMO-P0-EPIC.json").exists());

    let output = demo_runner(dir.path(), &["--phases", "1", "--dry-run"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let ids: Vec<String> = stdout(&output)
        .split_whitespace()
        .filter(|w| w.starts_with("DEMO-P"))
        .map(str::to_string)
        .collect();
    assert_eq!(
        ids,
        [
            "DEMO-P1-DASHBOARDS",
            "DEMO-P1-ALERTS",
            "DEMO-P1-SLOS",
            "DEMO-P1-NOTIFY",
            "DEMO-P1-RUNBOOKS"
        ]
    );
}

#[test]
fn second_setup_without_clean_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    assert!(task_setup(dir.path(), &[]).status.success());

    let output = task_setup(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--clean"));
}

#[test]
fn list_reports_materialized_status() {
    let dir = tempfile::tempdir().unwrap();
    assert!(task_setup(dir.path(), &["--phases", "2"]).status.success());

    let output = task_setup(dir.path(), &["--list", "--phases", "2"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("DEMO-P2-HISTORY"));
    assert!(text.contains("todo"));
    assert!(!text.contains("DEMO-P1-"));
}

#[test]
fn dry_run_setup_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = task_setup(dir.path(), &["--dry-run"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("[DRY RUN]"));
    assert!(!dir.path().join("ecosystem-demo").exists());
}

#[test]
fn check_without_api_key_fails_and_names_it() {
    let dir = tempfile::tempdir().unwrap();
    let output = demo_runner(dir.path(), &["--check"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("ANTHROPIC_API_KEY"));
}

#[test]
fn out_of_range_phase_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = task_setup(dir.path(), &["--phases", "7"]);
    assert!(!output.status.success());
}
