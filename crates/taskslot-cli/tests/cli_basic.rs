//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary and verify outputs. Every test passes
//! `--config` pointing into a temp dir so the user config is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskslot"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

#[test]
fn test_demo_sequential_is_back_to_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (stdout, stderr, code) = run_cli(
        &config,
        &[
            "demo",
            "--provider",
            "sequential",
            "--anchor",
            "2026-04-06T09:00:00Z",
            "--offset-minutes",
            "0",
            "--json",
        ],
    );
    assert_eq!(code, 0, "demo failed: {stderr}");
    assert!(stderr.contains("Task 'Task 1' added successfully."));

    let report = parse_json(&stdout);
    let assignments = report["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 3);
    assert_eq!(assignments[0]["task_name"], "Task 1");
    assert_eq!(assignments[0]["start_time"], "2026-04-06T09:00:00Z");
    assert_eq!(assignments[1]["start_time"], "2026-04-06T11:00:00Z");
    assert_eq!(assignments[2]["start_time"], "2026-04-06T12:30:00Z");
    assert_eq!(assignments[2]["end_time"], "2026-04-06T15:30:00Z");
}

#[test]
fn test_demo_fixed_offset_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (stdout, _, code) = run_cli(
        &config,
        &[
            "demo",
            "--provider",
            "fixed-offset",
            "--anchor",
            "2026-04-06T09:00:00Z",
        ],
    );
    assert_eq!(code, 0);
    assert!(stdout
        .contains("Task 'Task 1' scheduled from 2026-04-06 09:10:00 to 2026-04-06 11:10:00."));
    assert!(stdout.contains("overlapping"));
}

#[test]
fn test_run_reports_invalid_tasks_and_schedules_rest() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let tasks = dir.path().join("tasks.json");
    std::fs::write(
        &tasks,
        r#"[
            {"name": "Write report", "priority": 2, "estimated_minutes": 45},
            {"name": "Broken", "priority": 1, "estimated_hours": 0},
            {"name": "Email", "priority": 1, "estimated_hours": 0.25}
        ]"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(
        &config,
        &[
            "run",
            "--tasks",
            tasks.to_str().unwrap(),
            "--anchor",
            "2026-04-06T09:00:00Z",
            "--json",
        ],
    );
    assert_eq!(code, 0, "run failed: {stderr}");
    assert!(stderr.contains("skipped: Invalid task 'Broken'"));

    let report = parse_json(&stdout);
    let names: Vec<_> = report["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["task_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Email", "Write report"]);
}

#[test]
fn test_run_calendar_with_toml_tasks_and_busy_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let tasks = dir.path().join("tasks.toml");
    let busy = dir.path().join("busy.json");
    std::fs::write(
        &tasks,
        r#"
        [[task]]
        name = "Deep work"
        priority = 1
        estimated_hours = 2.0
        "#,
    )
    .unwrap();
    std::fs::write(
        &busy,
        r#"[{"id": "m1", "title": "Standup", "start_time": "2026-04-06T09:00:00Z", "end_time": "2026-04-06T10:00:00Z"}]"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(
        &config,
        &[
            "run",
            "--tasks",
            tasks.to_str().unwrap(),
            "--provider",
            "calendar",
            "--busy",
            busy.to_str().unwrap(),
            "--anchor",
            "2026-04-06T08:00:00Z",
            "--offset-minutes",
            "0",
            "--json",
        ],
    );
    assert_eq!(code, 0, "run failed: {stderr}");
    let report = parse_json(&stdout);
    assert_eq!(
        report["assignments"][0]["start_time"],
        "2026-04-06T10:00:00Z"
    );
}

#[test]
fn test_run_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (_, stderr, code) = run_cli(&config, &["run", "--tasks", "/nonexistent/tasks.json"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (stdout, _, code) = run_cli(&config, &["config", "set", "scheduler.gap_minutes", "15"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(&config, &["config", "get", "scheduler.gap_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "15");

    let (_, stderr, code) = run_cli(&config, &["config", "set", "scheduler.bogus", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key"));

    let (_, _, code) = run_cli(&config, &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&config, &["config", "get", "scheduler.gap_minutes"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_config_list_is_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (stdout, _, code) = run_cli(&config, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[scheduler]"));
    assert!(stdout.contains("provider = \"sequential\""));
}

/// Run without `--config`, with HOME pointed at `home`.
fn run_cli_with_home(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskslot"))
        .args(args)
        .env("HOME", home)
        .env_remove("TASKSLOT_ENV")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

const MISSPELLED_PROVIDER: &str = "[scheduler]\nprovider = \"calendr\"\n";

#[test]
fn test_malformed_user_config_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".config").join("taskslot");
    std::fs::create_dir_all(&dir).unwrap();
    let config = dir.join("config.toml");
    std::fs::write(&config, MISSPELLED_PROVIDER).unwrap();

    let (stdout, stderr, code) = run_cli_with_home(home.path(), &["demo"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error: Configuration error"), "{stderr}");
    assert!(!stdout.contains("scheduled"));

    let (_, _, code) = run_cli_with_home(
        home.path(),
        &["config", "set", "scheduler.gap_minutes", "5"],
    );
    assert_ne!(code, 0);
    assert_eq!(std::fs::read_to_string(&config).unwrap(), MISSPELLED_PROVIDER);
}

#[test]
fn test_malformed_explicit_config_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, MISSPELLED_PROVIDER).unwrap();

    let (_, stderr, code) = run_cli(&config, &["config", "set", "scheduler.gap_minutes", "5"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to parse configuration"), "{stderr}");
    assert_eq!(std::fs::read_to_string(&config).unwrap(), MISSPELLED_PROVIDER);
}

#[test]
fn test_missing_user_config_is_created_with_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) =
        run_cli_with_home(home.path(), &["config", "get", "scheduler.provider"]);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(stdout.trim(), "sequential");
    assert!(home.path().join(".config/taskslot/config.toml").exists());
}
