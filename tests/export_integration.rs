//! Integration tests for file exports of engine output.

mod common;

use std::fs;

use drivecycle::engine::Engine;
use drivecycle::io::{export_csv, export_json, export_schedule_csv, export_step_table_csv};
use drivecycle::model::CycleConfig;

#[test]
fn profile_csv_matches_report() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("profile.csv");
    let report = Engine::default().run(&common::two_day_config());

    export_csv(&report.profile, &path).expect("CSV export should succeed");

    let content = fs::read_to_string(&path).expect("CSV should be readable");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Time,Current",
            "0,0",
            "3600,10",
            "86400,0",
            "88200,-5",
            "172800,0"
        ]
    );
}

#[test]
fn profile_csv_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let cfg = common::commuter_config(common::date(2024, 1, 1), common::date(2024, 1, 14));
    let engine = Engine::default();

    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    export_csv(&engine.run(&cfg).profile, &a).expect("first export");
    export_csv(&engine.run(&cfg).profile, &b).expect("second export");

    let first = fs::read(&a).expect("read a");
    let second = fs::read(&b).expect("read b");
    assert_eq!(first, second);
}

#[test]
fn schedule_csv_lists_every_day() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("schedule.csv");
    let report = Engine::default().run(&common::two_day_config());

    export_schedule_csv(&report.days, &path).expect("schedule export should succeed");

    let mut rdr = csv::Reader::from_path(&path).expect("schedule CSV should open");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.expect("valid row")).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "DC1");
    assert_eq!(&rows[0][3], "rule 1");
    assert_eq!(&rows[1][2], "DC2");
    assert_eq!(&rows[1][3], "default");
    assert_eq!(&rows[1][5], "84600.0");
}

#[test]
fn step_table_csv_keeps_every_declared_step() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("steps.csv");
    let cfg = common::commuter_config(common::date(2024, 1, 1), common::date(2024, 1, 6));
    let engine = Engine::default();
    let report = engine.run(&cfg);

    let rows = engine.step_table(&cfg, &report.days);
    export_step_table_csv(&rows, &path).expect("step table export should succeed");

    let mut rdr = csv::Reader::from_path(&path).expect("step table CSV should open");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.expect("valid row")).collect();
    // monthly test 32 + 4 commutes of 13 + weekend 2, plus one idle row per day
    assert_eq!(rows.len(), 32 + 4 * 13 + 2 + 6);

    let saturday: Vec<&csv::StringRecord> = rows.iter().filter(|r| &r[1] == "6").collect();
    let units: Vec<&str> = saturday.iter().map(|r| &r[7]).collect();
    assert_eq!(units, vec!["C", "V", "A"]);
    assert_eq!(&saturday[2][4], "idle");
    assert_eq!(&saturday[2][9], "84600");

    // zero-current steps are listed even though the profile skips them
    assert!(rows.iter().any(|r| &r[4] == "accelerate" && &r[5] == "3" && &r[6] == "0"));
    let last = rows.last().expect("table should not be empty");
    assert_eq!(&last[0], "92");
}

#[test]
fn json_export_reloads_to_same_config() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("config.json");
    let cfg = common::commuter_config(common::date(2024, 1, 1), common::date(2024, 2, 1));

    export_json(&cfg, &path).expect("JSON export should succeed");
    let reloaded = CycleConfig::from_json_file(&path).expect("export should reload");

    assert_eq!(reloaded, cfg);
    let a = Engine::default().run(&cfg);
    let b = Engine::default().run(&reloaded);
    assert_eq!(a.profile, b.profile);
}

#[test]
fn export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("missing").join("profile.csv");
    let report = Engine::default().run(&common::two_day_config());
    assert!(export_csv(&report.profile, &path).is_err());
}
