//! End-to-end tests for the `tourfence` binary.
//!
//! Each test points XDG_CONFIG_HOME at a temp directory so the user's own
//! config.ini is never read or written.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CATALOG_JSON: &str = r#"[
    {
        "id": "chapel",
        "title": "Memorial Chapel",
        "center": [-76.94177, 38.913078],
        "radius_m": 15
    }
]"#;

const TRACE_CSV: &str = "\
timestamp_ms,longitude,latitude,accuracy_m
0,-76.9420,38.9129,4.0
1000,-76.9420,38.9129,120.0
2000,unavailable,gps timeout
3000,-76.94177,38.913078,4.0
";

fn tourfence(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tourfence"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run tourfence")
}

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_check_reports_radius_override() {
    let temp = TempDir::new().unwrap();
    let points = write_fixture(&temp, "points.json", CATALOG_JSON);

    let args = [
        "check", "--points", &points, "--lon", "-76.9420", "--lat", "38.9129",
    ];
    let output = tourfence(temp.path(), &args);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 of 1 points inside"));

    let mut with_radius = args.to_vec();
    with_radius.extend(["--radius", "30"]);
    let output = tourfence(temp.path(), &with_radius);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 of 1 points inside"));
}

#[test]
fn test_replay_prints_events_and_summary() {
    let temp = TempDir::new().unwrap();
    let points = write_fixture(&temp, "points.json", CATALOG_JSON);
    let samples = write_fixture(&temp, "trace.csv", TRACE_CSV);

    let output = tourfence(
        temp.path(),
        &["replay", "--points", &points, "--samples", &samples],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rejected: accuracy 120.0m worse than 50.0m"));
    assert!(stdout.contains("tracking degraded: gps timeout"));
    assert!(stdout.contains("tracking recovered"));
    assert!(stdout.contains("2 accepted, 1 rejected"));
}

// dirs only honours XDG_CONFIG_HOME on Linux
#[cfg(target_os = "linux")]
#[test]
fn test_config_set_then_get() {
    let temp = TempDir::new().unwrap();

    let output = tourfence(temp.path(), &["config", "set", "geofence.radius_override_m", "25"]);
    assert!(output.status.success());
    assert!(temp.path().join("tourfence").join("config.ini").exists());

    let output = tourfence(temp.path(), &["config", "get", "geofence.radius_override_m"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "25");

    let output = tourfence(temp.path(), &["config", "get", "geofence.nope"]);
    assert!(!output.status.success());

    let output = tourfence(temp.path(), &["config", "set", "filter.max_accuracy_m", "NaN"]);
    assert!(!output.status.success());

    let output = tourfence(temp.path(), &["config", "unset", "geofence.radius_override_m"]);
    assert!(output.status.success());
    let output = tourfence(temp.path(), &["config", "get", "geofence.radius_override_m"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "-");
}

#[test]
fn test_missing_catalog_fails() {
    let temp = TempDir::new().unwrap();
    let output = tourfence(
        temp.path(),
        &["check", "--points", "/nonexistent/points.json", "--lon", "0", "--lat", "0"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read catalog"));
}
