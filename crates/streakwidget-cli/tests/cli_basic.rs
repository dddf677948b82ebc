//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! store, surfaces and config never touch the real data directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use streakwidget_core::SqliteStreakStore;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_streakwidget-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("STREAKWIDGET_ENV")
        .env("STREAKWIDGET_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn data_dir(home: &Path) -> PathBuf {
    home.join(".config").join("streakwidget")
}

fn write_streak(home: &Path, count: &str, last: &str) {
    let dir = data_dir(home);
    std::fs::create_dir_all(&dir).unwrap();
    let store = SqliteStreakStore::at(dir.join("streak.db"));
    store.write_raw("flutter.current_streak", count).unwrap();
    store.write_raw("flutter.last_login_date", last).unwrap();
}

fn parse(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_evaluate_active() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["evaluate", "--count", "5", "--last", "2024-03-10", "--today", "2024-03-11"],
    );
    assert_eq!(code, 0);
    let state = parse(&stdout);
    assert_eq!(state["count"], 5);
    assert_eq!(state["label"], "days streak");
    assert_eq!(state["visual_tier"], "active");
}

#[test]
fn test_evaluate_lost() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["evaluate", "--count", "5", "--last", "2024-03-09T10:00:00Z", "--today", "2024-03-11"],
    );
    assert_eq!(code, 0);
    let state = parse(&stdout);
    assert_eq!(state["count"], 0);
    assert_eq!(state["label"], "no streak");
    assert_eq!(state["visual_tier"], "lost");
}

#[test]
fn test_evaluate_negative_count() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["evaluate", "--count", "-2"]);
    assert_eq!(code, 0);
    assert_eq!(parse(&stdout)["visual_tier"], "inactive");
}

#[test]
fn test_refresh_without_surfaces() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["refresh"]);
    assert_eq!(code, 0);
    let outcome = parse(&stdout);
    assert_eq!(outcome["status"]["status"], "success");
    assert_eq!(outcome["report"]["rendered"], serde_json::json!([]));
}

#[test]
fn test_surface_attach_renders_stored_streak() {
    let home = tempfile::tempdir().unwrap();
    let today = chrono::Local::now().date_naive().to_string();
    write_streak(home.path(), "3", &today);

    let (_, _, code) = run_cli(home.path(), &["surface", "attach", "7"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["surface", "show", "7"]);
    assert_eq!(code, 0);
    let file = parse(&stdout);
    assert_eq!(file["render"]["request"]["count_text"], "3");
    assert_eq!(file["render"]["request"]["label_text"], "days streak");
    assert_eq!(file["render"]["asset"], "arcon_orange");

    let (stdout, _, _) = run_cli(home.path(), &["surface", "list"]);
    assert_eq!(parse(&stdout), serde_json::json!([7]));
}

#[test]
fn test_refresh_marks_stale_streak_lost() {
    let home = tempfile::tempdir().unwrap();
    write_streak(home.path(), "12", "2000-01-01");
    run_cli(home.path(), &["surface", "attach", "1"]);
    run_cli(home.path(), &["surface", "attach", "2"]);

    let (stdout, _, code) = run_cli(home.path(), &["refresh"]);
    assert_eq!(code, 0);
    let outcome = parse(&stdout);
    assert_eq!(outcome["report"]["rendered"], serde_json::json!([1, 2]));
    assert_eq!(outcome["report"]["state"]["visual_tier"], "lost");
}

#[test]
fn test_status_does_not_render() {
    let home = tempfile::tempdir().unwrap();
    let today = chrono::Local::now().date_naive().to_string();
    write_streak(home.path(), "1", &today);
    let surfaces = data_dir(home.path()).join("surfaces");
    std::fs::create_dir_all(&surfaces).unwrap();
    std::fs::write(surfaces.join("4.json"), r#"{"id":4,"render":null}"#).unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0);
    let status = parse(&stdout);
    assert_eq!(status["state"]["visual_tier"], "weak");
    assert_eq!(status["surfaces"], serde_json::json!([4]));
    assert_eq!(status["job"], "DailyStreakCheck");

    let (stdout, _, _) = run_cli(home.path(), &["surface", "show", "4"]);
    assert!(parse(&stdout)["render"].is_null());
}

#[test]
fn test_surface_detach_unknown_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["surface", "detach", "99"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not attached"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "schedule.period_hours"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "24");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "schedule.flex_minutes", "30"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "schedule.flex_minutes"]);
    assert_eq!(stdout.trim(), "30");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "schedule.nope", "1"]);
    assert_ne!(code, 0);

    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "schedule.flex_minutes"]);
    assert_eq!(stdout.trim(), "60");
}
