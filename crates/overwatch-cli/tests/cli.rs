use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn overwatch() -> Command {
    Command::cargo_bin("overwatch").unwrap()
}

#[test]
fn overwatch_table_build_writes_csv() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("tables.csv");
    overwatch()
        .args(["table", "build", "--step", "0.05", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("600 rows"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("distance_km,ia,ib,ic,fault_type"));
}

#[test]
fn overwatch_simulate_then_locate() {
    let dir = tempdir().unwrap();
    let tables = dir.path().join("tables.csv");
    let frame = dir.path().join("frame.csv");

    overwatch()
        .args(["table", "build", "--out", tables.to_str().unwrap()])
        .assert()
        .success();
    overwatch()
        .args([
            "simulate",
            "--distance",
            "5",
            "--fault-type",
            "slg",
            "--out",
            frame.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("UNIT"));

    let output = overwatch()
        .args([
            "locate",
            "--table",
            tables.to_str().unwrap(),
            "--frame",
            frame.to_str().unwrap(),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["label"], "Single Line-to-Ground (Phase A)");
    assert_eq!(value["result"]["unit_index"], 1);
    let distance = value["result"]["distance_km"].as_f64().unwrap();
    assert!((distance - 5.0).abs() <= 0.01);
    assert_eq!(value["report"]["severity"], "WARNING");
    assert_eq!(value["report"]["unit_distance_km"], 3.0);
    let metres = value["report"]["distance_m"].as_f64().unwrap();
    assert!((metres - distance * 1000.0).abs() < 1e-6);
}

#[test]
fn overwatch_locate_reports_close_in_fault_as_critical() {
    let dir = tempdir().unwrap();
    let tables = dir.path().join("tables.csv");
    let frame = dir.path().join("frame.csv");

    overwatch()
        .args(["table", "build", "--out", tables.to_str().unwrap()])
        .assert()
        .success();
    overwatch()
        .args([
            "simulate",
            "--distance",
            "0.2",
            "--fault-type",
            "3ph",
            "--out",
            frame.to_str().unwrap(),
        ])
        .assert()
        .success();
    overwatch()
        .args([
            "locate",
            "--table",
            tables.to_str().unwrap(),
            "--frame",
            frame.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Three-Phase Balanced"))
        .stdout(predicate::str::contains("CRITICAL"))
        .stdout(predicate::str::contains("(0.00 km)"));
}

#[test]
fn overwatch_locate_without_tables_fails() {
    let dir = tempdir().unwrap();
    let frame = dir.path().join("frame.csv");
    fs::write(&frame, "ia,ib,ic\n900,0,0\n900,0,0\n0,0,0\n").unwrap();

    overwatch()
        .args([
            "locate",
            "--table",
            dir.path().join("missing.csv").to_str().unwrap(),
            "--frame",
            frame.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("table build"));
}

#[test]
fn overwatch_quiet_frame_reports_no_fault() {
    let dir = tempdir().unwrap();
    let tables = dir.path().join("tables.csv");
    let frame = dir.path().join("frame.csv");
    fs::write(&frame, "ia,ib,ic\n10,12,9\n10,12,9\n0,0,0\n").unwrap();

    overwatch()
        .args(["table", "build", "--step", "0.1", "--out", tables.to_str().unwrap()])
        .assert()
        .success();
    overwatch()
        .args([
            "locate",
            "--table",
            tables.to_str().unwrap(),
            "--frame",
            frame.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No Fault"));
}

#[test]
fn overwatch_impedance_three_phase() {
    overwatch()
        .args(["impedance", "--distance", "4", "--fault-type", "3ph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4.000 km"));
}

#[test]
fn overwatch_compare_summarizes_trials() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("trials.csv");
    overwatch()
        .args([
            "compare",
            "--distance",
            "3",
            "--fault-type",
            "ll",
            "--trials",
            "50",
            "--step",
            "0.05",
            "--out",
            report.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct classification"))
        .stdout(predicate::str::contains("0 critical, 50 warning"));

    let text = fs::read_to_string(&report).unwrap();
    assert_eq!(text.lines().count(), 51);
    assert!(text.lines().skip(1).all(|line| line.ends_with(",WARNING")));
}

#[test]
fn overwatch_rejects_unknown_fault_type() {
    overwatch()
        .args(["impedance", "--distance", "4", "--fault-type", "lll"])
        .assert()
        .failure();
}

#[test]
fn overwatch_config_file_is_honoured() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("feeder.toml");
    fs::write(
        &config,
        "[feeder]\nlength_km = 6.0\nunit_distances_km = [0.0, 2.0]\n",
    )
    .unwrap();
    overwatch()
        .args([
            "simulate",
            "--distance",
            "5",
            "--fault-type",
            "ll",
            "--config",
            config.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unit_distances_km\""));

    fs::write(&config, "[feeder]\nunit_distances_km = [1.0, 2.0]\n").unwrap();
    overwatch()
        .args([
            "impedance",
            "--distance",
            "1",
            "--fault-type",
            "slg",
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("feeder.toml"));
}
