//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temporary
//! directory, so the config file starts out absent.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command with `stdin` piped in and return (code, stdout, stderr).
fn run_cli_with_input(home: &TempDir, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomoline"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("POMOLINE_ENV")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(home, args, "")
}

#[test]
fn test_config_list_json() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "list", "--json"]);
    assert_eq!(code, 0, "config list failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["work_minutes"], 25);
    assert_eq!(parsed["timer"]["break_minutes"], 5);
    assert_eq!(parsed["timer"]["long_break_minutes"], 30);
    assert_eq!(parsed["display"]["show_seconds"], false);

    assert!(home.path().join(".config/pomoline/config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "timer.work_minutes", "50"]);
    assert_eq!(code, 0, "config set failed");

    let (code, stdout, _) = run_cli(&home, &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_config_rejects_zero_minutes() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "set", "timer.break_minutes", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timer.break_minutes"), "stderr: {stderr}");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key: timer.nope"), "stderr: {stderr}");
}

#[test]
fn test_config_list_prints_stored_toml() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[timer]"), "stdout: {stdout}");
    assert!(stdout.contains("work_minutes = 25"), "stdout: {stdout}");

    let (_, path, _) = run_cli(&home, &["config", "path"]);
    let stored = std::fs::read_to_string(path.trim()).unwrap();
    assert_eq!(stored, stdout);
}

#[test]
fn test_config_hook_and_unhook() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(
        &home,
        &["config", "hook", "session-completed", "notify-send done"],
    );
    assert_eq!(code, 0, "config hook failed");

    let (_, stdout, _) = run_cli(&home, &["config", "list"]);
    assert!(stdout.contains("[hooks]"), "stdout: {stdout}");
    assert!(stdout.contains("notify-send done"), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(&home, &["config", "unhook", "session-completed"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("removed 1"), "stdout: {stdout}");
    let (_, stdout, _) = run_cli(&home, &["config", "list"]);
    assert!(!stdout.contains("notify-send done"), "stdout: {stdout}");
}

#[test]
fn test_config_hook_rejects_unknown_event() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "hook", "lunch-started", "true"]);
    assert_eq!(code, 2, "clap usage error expected");
    assert!(stderr.contains("lunch-started"), "stderr: {stderr}");
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("pomoline"));
}

#[test]
fn test_run_start_status_interrupt() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_with_input(
        &home,
        &["run"],
        "start write spec\nstatus\ninterrupt\nquit\n",
    );
    assert_eq!(code, 0, "run failed: {stdout}");

    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("working <W 25>"));
    assert_eq!(lines.last(), Some("idle"));

    let json_start = stdout.find('{').unwrap();
    let json_end = stdout.rfind('}').unwrap();
    let snapshot: serde_json::Value =
        serde_json::from_str(&stdout[json_start..=json_end]).unwrap();
    assert_eq!(snapshot["state"], "working");
    assert_eq!(snapshot["task"], "write spec");
    assert_eq!(snapshot["display"], "<W 25> ");
}

#[test]
fn test_run_prompts_for_task_on_next_line() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli_with_input(&home, &["run"], "start\nreview notes\nstatus\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("Task: "), "stderr: {stderr}");
    assert!(stdout.contains("\"task\": \"review notes\""), "stdout: {stdout}");
}

#[test]
fn test_run_reports_rejected_commands_and_continues() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli_with_input(
        &home,
        &["run", "--no-prompt", "--work", "50"],
        "interrupt\nstart\nbreak\nfly\nstatus\n",
    );
    assert_eq!(code, 0);
    assert!(stderr.contains("error: Cannot interrupt while idle"), "stderr: {stderr}");
    assert!(stderr.contains("error: Not complete"), "stderr: {stderr}");
    assert!(stderr.contains("unknown command: fly"), "stderr: {stderr}");
    assert!(stdout.starts_with("working <W 50>"), "stdout: {stdout}");
    assert!(stdout.contains("\"task\": null"), "stdout: {stdout}");
}

#[test]
fn test_run_picks_up_config_changes_between_sessions() {
    let home = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomoline"))
        .args(["run", "--no-prompt"])
        .env("HOME", home.path())
        .env_remove("POMOLINE_ENV")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to execute CLI command");
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut next_line = || {
        let mut line = String::new();
        stdout.read_line(&mut line).unwrap();
        line.trim_end().to_string()
    };

    writeln!(stdin, "start a").unwrap();
    assert_eq!(next_line(), "working <W 25>");
    writeln!(stdin, "interrupt").unwrap();
    assert_eq!(next_line(), "idle");

    // Edited from another shell while the session host keeps running.
    let (code, _, _) = run_cli(&home, &["config", "set", "timer.work_minutes", "50"]);
    assert_eq!(code, 0);

    writeln!(stdin, "start b").unwrap();
    assert_eq!(next_line(), "working <W 50>");

    writeln!(stdin, "quit").unwrap();
    drop(stdin);
    assert!(child.wait().unwrap().success());
}
