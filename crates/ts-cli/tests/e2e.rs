//! End-to-end tests running the `tsheet` binary against temp tables.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const ACTIONS: &str = "\
Attendance export,,,
Generated,2025-01-15,,
,,,
StateID,Name,Action,Time
1,A,Check In,2025-01-15 09:00:00
1,A,Check Out,2025-01-15 11:30:00
2,B,Check In,2025-01-15 08:00:00
2,B,Check Out,2025-01-15 08:00:00
3,C,Check Out,2025-01-15 07:00:00
3,C,Check In,2025-01-15 18:00:00
3,C,Check In,2025-01-15 19:00:00
3,C,Check Out,2025-01-15 21:00:00
";

fn tsheet_binary() -> String {
    env!("CARGO_BIN_EXE_tsheet").to_string()
}

/// Runs tsheet with config lookups confined to `home`.
fn tsheet(home: &Path, args: &[&str]) -> Output {
    Command::new(tsheet_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run tsheet")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "tsheet should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_actions(temp: &TempDir) -> String {
    let path = temp.path().join("actions.csv");
    std::fs::write(&path, ACTIONS).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_overview_ranks_nonzero_people() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    let out = stdout(&tsheet(temp.path(), &["overview", &file]));
    assert_eq!(out, "    3h 00m  C [#3]\n    2h 30m  A [#1]\n");
}

#[test]
fn test_overview_json() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    let out = stdout(&tsheet(temp.path(), &["overview", &file, "--json"]));
    let entries: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[1]["label"], "A [#1]");
    assert_eq!(entries[1]["total_ms"], 9_000_000);
}

#[test]
fn test_names_start_with_overview() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    let out = stdout(&tsheet(temp.path(), &["names", &file]));
    assert_eq!(out, "Overview\nA [#1]\nC [#3]\n");
}

#[test]
fn test_detail_and_unknown_selection() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    let out = stdout(&tsheet(temp.path(), &["detail", &file, "A [#1]"]));
    assert!(out.starts_with("A [#1] - clocked time: 2h 30m\n\nUTC+0\n"));
    assert!(out.contains("in: 2025-01-15 09:00:00  -  out: 2025-01-15 11:30:00 - 2h 30m\n"));

    let overview = stdout(&tsheet(temp.path(), &["detail", &file, "Overview"]));
    let direct = stdout(&tsheet(temp.path(), &["overview", &file]));
    assert_eq!(overview, direct);

    let missing = tsheet(temp.path(), &["detail", &file, "Nobody"]);
    assert!(!missing.status.success());
    let stderr = String::from_utf8_lossy(&missing.stderr);
    assert!(stderr.contains("no person matches \"Nobody\""), "stderr: {stderr}");
}

#[test]
fn test_duplicate_policy_flag() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    // C: in 18:00, in 19:00, out 21:00.
    let keep = stdout(&tsheet(temp.path(), &["detail", &file, "C [#3]"]));
    assert!(keep.starts_with("C [#3] - clocked time: 3h 00m"));

    let restart = stdout(&tsheet(
        temp.path(),
        &["detail", &file, "C [#3]", "--on-duplicate", "restart"],
    ));
    assert!(restart.starts_with("C [#3] - clocked time: 2h 00m"));

    let close = stdout(&tsheet(
        temp.path(),
        &["--on-duplicate", "close", "detail", &file, "C [#3]"],
    ));
    assert!(close.starts_with("C [#3] - clocked time: 3h 00m"));
    assert_eq!(close.matches("in: ").count(), 2);
}

#[test]
fn test_anomalies_listing() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    let out = stdout(&tsheet(temp.path(), &["anomalies", &file]));
    assert!(out.starts_with("C [#3]: crashes 1, pre 1, post 0, other 0\n"));
    assert!(out.contains("row 11"));

    let json = stdout(&tsheet(temp.path(), &["anomalies", &file, "--json"]));
    let issues: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(issues[0]["label"], "C [#3]");
    assert_eq!(issues[0]["anomalies"]["pre"][0]["position"], 9);
}

#[test]
fn test_export_default_path() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);

    stdout(&tsheet(temp.path(), &["export", &file]));
    let csv = std::fs::read_to_string(temp.path().join("actions_overview.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name,Time Worked (hrs),Shift 1 (hrs),Shift 2 (hrs),Shift 3 (hrs)",
            "C [#3],3.00,0.00,3.00,0.00",
            "A [#1],2.50,2.50,0.00,0.00",
            "B [#2],0.00,0.00,0.00,0.00",
        ]
    );
}

#[test]
fn test_timeline_to_file_with_timezone() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);
    let output = temp.path().join("timeline.json");

    stdout(&tsheet(
        temp.path(),
        &[
            "timeline",
            &file,
            "--timezone",
            "-5",
            "-o",
            &output.to_string_lossy(),
        ],
    ));
    let timeline: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(timeline["start"], "2025-01-15T02:00:00");
    assert_eq!(timeline["end"], "2025-01-15T16:00:00");
    assert_eq!(timeline["rows"][0]["label"], "C [#3]");
}

#[test]
fn test_config_file_sets_timezone() {
    let temp = TempDir::new().unwrap();
    let file = write_actions(&temp);
    let config_dir = temp.path().join(".config/tsheet");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "timezone_offset_hours = 3\n").unwrap();

    let out = stdout(&tsheet(temp.path(), &["detail", &file, "A [#1]"]));
    assert!(out.contains("UTC+3\nin: 2025-01-15 12:00:00"));
}

#[test]
fn test_empty_table_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.csv");
    std::fs::write(&path, "Name,Action,Time\n").unwrap();

    let out = stdout(&tsheet(temp.path(), &["overview", &path.to_string_lossy()]));
    assert_eq!(out, "No completed sessions.\n");

    let detail = stdout(&tsheet(
        temp.path(),
        &["detail", &path.to_string_lossy(), "Overview"],
    ));
    assert_eq!(detail, out);
}

#[test]
fn test_unsupported_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let output = tsheet(temp.path(), &["overview", &path.to_string_lossy()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read attendance table"));
}

#[test]
fn test_no_command_prints_help() {
    let temp = TempDir::new().unwrap();
    let out = stdout(&tsheet(temp.path(), &[]));
    assert!(out.contains("Usage: tsheet"));
}
