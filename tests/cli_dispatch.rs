use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use uuid::Uuid;

fn unique_workspace(prefix: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&path).expect("workspace should be creatable");
    path
}

fn run_lift(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lift"))
        .current_dir(root)
        .env_remove("LIFT_CONFIG")
        .env_remove("LIFT_LOG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--db")
        .arg(root.join("fitness.sqlite"))
        .args(args)
        .output()
        .expect("lift command should run")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success but failed.\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "expected failure but command succeeded.\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn json_id(value: &Value, key: &str) -> String {
    value[key]
        .as_i64()
        .unwrap_or_else(|| panic!("'{key}' should be an integer in {value}"))
        .to_string()
}

const CATALOG: &str = r#"[
  {
    "name": "Barbell Bench Press - Medium Grip",
    "level": "beginner",
    "category": "strength",
    "equipment": "barbell",
    "primaryMuscles": ["chest"],
    "instructions": ["Lie back on a flat bench.", "Press the bar up."]
  },
  {
    "id": "Dips_-_Triceps_Version",
    "name": "Dips - Triceps Version",
    "level": "beginner",
    "category": "strength"
  },
  { "name": "", "level": "beginner", "category": "strength" }
]"#;

fn load_catalog(root: &Path) -> Value {
    let file = root.join("exercises.json");
    std::fs::write(&file, CATALOG).expect("catalog file should be writable");
    let output = run_lift(
        root,
        &["--json", "catalog", "load", file.to_str().expect("utf8 path")],
    );
    assert_success(&output);
    parse_json(&output)
}

#[test]
fn health_reports_ok() {
    let root = unique_workspace("lift-cli-health");
    let output = run_lift(&root, &["health"]);
    assert_success(&output);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ok");
    assert!(root.join("fitness.sqlite").exists());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn routine_new_then_list_as_json() {
    let root = unique_workspace("lift-cli-routine");
    let created = run_lift(&root, &["--json", "routine", "new", "Leg Day", "-m", "squats"]);
    assert_success(&created);
    let routine = parse_json(&created);
    assert_eq!(routine["name"], "Leg Day");
    assert_eq!(routine["description"], "squats");

    let days = run_lift(
        &root,
        &["--json", "routine", "days", &json_id(&routine, "id"), "fri", "mon"],
    );
    assert_success(&days);
    assert_eq!(parse_json(&days)["days"], serde_json::json!(["monday", "friday"]));

    let listed = run_lift(&root, &["routine", "ls", "--json"]);
    assert_success(&listed);
    let list = parse_json(&listed);
    let list = list.as_array().expect("routine list should be an array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Leg Day");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn blank_routine_name_fails_with_error_prefix() {
    let root = unique_workspace("lift-cli-invalid");
    let output = run_lift(&root, &["routine", "new", "   "]);
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: invalid name"), "stderr: {stderr}");
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn catalog_load_reports_counts_and_status() {
    let root = unique_workspace("lift-cli-catalog");
    let summary = load_catalog(&root);
    assert_eq!(summary["processed_count"], 3);
    assert_eq!(summary["created_count"], 2);
    assert_eq!(summary["skipped_count"], 1);

    let shown = run_lift(
        &root,
        &["--json", "exercise", "show", "Barbell_Bench_Press_-_Medium_Grip"],
    );
    assert_success(&shown);
    let exercise = parse_json(&shown);
    assert_eq!(exercise["name"], "Barbell Bench Press - Medium Grip");
    assert_eq!(
        exercise["images"].as_array().map(Vec::len),
        Some(2),
        "exercise view should list two images"
    );

    let status = run_lift(&root, &["--json", "catalog", "status"]);
    assert_success(&status);
    assert!(parse_json(&status)["last_sync"].is_string());

    let missing = run_lift(&root, &["exercise", "show", "nope"]);
    assert_failure(&missing);
    assert!(String::from_utf8_lossy(&missing.stderr).contains("exercise 'nope' not found"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn second_workout_start_conflicts() {
    let root = unique_workspace("lift-cli-workout");
    load_catalog(&root);

    let routine = parse_json(&run_lift(&root, &["--json", "routine", "new", "Push Day"]));
    let routine_id = json_id(&routine, "id");
    let slot = run_lift(&root, &["--json", "slot", "add", &routine_id]);
    assert_success(&slot);
    let slot_id = json_id(&parse_json(&slot), "routine_item_id");
    let item = run_lift(
        &root,
        &["--json", "item", "add", &slot_id, "Dips_-_Triceps_Version"],
    );
    assert_success(&item);

    let started = run_lift(&root, &["--json", "workout", "start", &routine_id]);
    assert_success(&started);
    let session = parse_json(&started);
    assert_eq!(session["state"], "in_progress");
    let session_id = json_id(&session, "id");

    let active = run_lift(&root, &["--json", "workout", "active"]);
    assert_success(&active);
    let active = parse_json(&active);
    assert_eq!(active["state"], "in_progress");
    assert_eq!(active["session"]["id"], session["id"]);

    let again = run_lift(&root, &["workout", "start", &routine_id]);
    assert_failure(&again);
    assert_eq!(again.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(stderr.starts_with("error: conflict"), "stderr: {stderr}");

    let ended = run_lift(&root, &["--json", "workout", "end", &session_id, "1200"]);
    assert_success(&ended);
    assert_eq!(parse_json(&ended)["state"], "completed");

    let active = run_lift(&root, &["--json", "workout", "active"]);
    assert_success(&active);
    let active = parse_json(&active);
    assert_eq!(active["state"], "no_active_session");
    assert!(active["session"].is_null());

    let _ = std::fs::remove_dir_all(root);
}
