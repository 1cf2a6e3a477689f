use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskboard");
    Command::new(exe)
        .args(args)
        .env("TASKBOARD_CONFIG_PATH", "/nonexistent/taskboard/config.json")
        .output()
        .expect("failed to run taskboard")
}

#[test]
fn add_command_succeeds() {
    let output = run(&["add", "demo task"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: demo task"));
}

#[test]
fn add_command_rejects_missing_title() {
    let output = run(&["add"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - title is required"));
}

#[test]
fn add_command_rejects_unknown_priority() {
    let output = run(&["add", "demo", "--priority", "urgent"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown priority"));
}

#[test]
fn add_command_json_reports_fields() {
    let output = run(&[
        "add",
        "Buy milk",
        "-d",
        "2%",
        "--priority",
        "high",
        "--important",
        "--due",
        "2025-12-24",
        "--json",
    ]);

    assert!(output.status.success());
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["description"], "2%");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["is_important"], true);
    assert_eq!(task["completed"], false);
    assert_eq!(task["due_date"], "2025-12-24T00:00:00Z");
    assert!(task["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(task["created_at"].is_string());
}

#[test]
fn delete_on_fresh_store_reports_not_found() {
    let output = run(&["delete", "task-1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task 'task-1' not found"));
}

#[test]
fn settings_reflect_overrides() {
    let output = run(&[
        "settings",
        "--json",
        "--config-override",
        "theme=dark",
        "--config-override",
        "auto_archive=true",
    ]);

    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["theme"], "noir");
    assert_eq!(settings["auto_archive"], true);
    assert_eq!(settings["notifications"], true);
    assert_eq!(settings["refresh_delay_ms"], 1000);
}

#[test]
fn invalid_override_is_rejected() {
    let output = run(&["settings", "--config-override", "colour=red"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown config field 'colour'"));
}
