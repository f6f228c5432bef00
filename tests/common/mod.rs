//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use drivecycle::model::{
    CalendarRule, CycleConfig, DriveCycle, DriveCycleSegment, Step, SubCycle,
};

/// Shorthand for a calendar date.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Two-day scenario: Mondays in January run DC1 (10 A for one hour),
/// every other day the default DC2 (-5 A for half an hour).
///
/// 2024-01-01 is a Monday.
pub fn two_day_config() -> CycleConfig {
    CycleConfig {
        sub_cycles: vec![
            SubCycle::new("SC1", vec![Step::fixed(10.0, "A", 3600.0)]),
            SubCycle::new("SC2", vec![Step::fixed(-5.0, "A", 1800.0)]),
        ],
        drive_cycles: vec![
            DriveCycle::new("DC1", vec![DriveCycleSegment::new("SC1", 1)]),
            DriveCycle::new("DC2", vec![DriveCycleSegment::new("SC2", 1)]),
        ],
        calendar_rules: vec![CalendarRule::weekdays(&[1], &["Mon"], "DC1")],
        default_drive_cycle_id: Some("DC2".to_string()),
        start_date: Some(date(2024, 1, 1)),
        end_date: Some(date(2024, 1, 2)),
        ..CycleConfig::default()
    }
}

/// Mixed-unit commuter config over the given range.
///
/// Weekdays run a commute (dynamic power pulses plus a C-rate charge),
/// weekends a short top-up, the 1st of every month a long test cycle.
pub fn commuter_config(start: NaiveDate, end: NaiveDate) -> CycleConfig {
    CycleConfig {
        sub_cycles: vec![
            SubCycle::new(
                "accelerate",
                vec![
                    Step::dynamic(-370.0, "W", 12.5),
                    Step::fixed(-20.0, "A", 600.0),
                    Step::fixed(0.0, "A", 120.0),
                ],
            ),
            SubCycle::new("charge", vec![Step::fixed(0.5, "C", 7200.0)]),
            SubCycle::new(
                "topup",
                vec![Step::fixed(1.0, "C", 1800.0), Step::fixed(4.1, "V", 600.0)],
            ),
        ],
        drive_cycles: vec![
            DriveCycle::new(
                "COMMUTE",
                vec![
                    DriveCycleSegment::new("accelerate", 4),
                    DriveCycleSegment::new("charge", 1),
                ],
            ),
            DriveCycle::new("WEEKEND", vec![DriveCycleSegment::new("topup", 1)]),
            DriveCycle::new(
                "MONTHLY_TEST",
                vec![
                    DriveCycleSegment::new("charge", 2),
                    DriveCycleSegment::new("accelerate", 10),
                ],
            ),
        ],
        calendar_rules: vec![
            CalendarRule::dates(&(1..=12).collect::<Vec<_>>(), &[1], "MONTHLY_TEST"),
            CalendarRule::weekdays(
                &(1..=12).collect::<Vec<_>>(),
                &["Sat", "Sun"],
                "WEEKEND",
            ),
        ],
        default_drive_cycle_id: Some("COMMUTE".to_string()),
        start_date: Some(start),
        end_date: Some(end),
        ..CycleConfig::default()
    }
}

/// Config whose only drive cycle runs 30 hours, longer than a day.
pub fn overlong_config(days: u32) -> CycleConfig {
    CycleConfig {
        sub_cycles: vec![SubCycle::new(
            "endurance",
            vec![Step::fixed(-2.0, "A", 3600.0).repeated(30)],
        )],
        drive_cycles: vec![DriveCycle::new(
            "LONG",
            vec![DriveCycleSegment::new("endurance", 1)],
        )],
        default_drive_cycle_id: Some("LONG".to_string()),
        start_date: Some(date(2024, 3, 1)),
        end_date: Some(date(2024, 3, days)),
        ..CycleConfig::default()
    }
}

/// Sample index at which each day ends, i.e. where `time` hits a multiple
/// of 86,400 s.
pub fn day_boundaries(time: &[f64]) -> Vec<usize> {
    time.iter()
        .enumerate()
        .filter(|(i, t)| *i > 0 && (*t % 86_400.0).abs() < 1e-6)
        .map(|(i, _)| i)
        .collect()
}
