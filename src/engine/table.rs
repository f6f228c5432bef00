//! Per-step simulation table: the declared steps of every scheduled day.
//!
//! Unlike the sample profile, the table keeps steps the current profile
//! cannot express (voltage steps, triggers, ambient conditions), so a
//! downstream cell simulator can replay the schedule step by step.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::index::CycleIndex;
use super::schedule::{DayStatus, DaySummary};
use crate::model::{CycleConfig, DriveCycleSegment, Step, StepValue, Trigger, Unit};

/// Sub-cycle id of the row closing every day.
pub const IDLE_SUB_CYCLE: &str = "idle";

/// How a row is run by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Fixed,
    Dynamic,
    /// Zero current until the end of the day.
    Idle,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::Dynamic => f.write_str("dynamic"),
            Self::Idle => f.write_str("idle"),
        }
    }
}

/// One row of the step table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// 1-based position over the whole table.
    pub global_index: usize,
    pub day_index: usize,
    pub date: NaiveDate,
    pub drive_cycle_id: Option<String>,
    pub sub_cycle_id: String,
    /// 1-based position of the step inside its sub-cycle.
    pub sub_cycle_step_index: usize,
    pub value: StepValue,
    pub unit: Unit,
    pub kind: StepKind,
    /// Seconds per repetition; for the idle row, the rest of the day.
    pub duration: f64,
    pub repetitions: u32,
    /// Slice length of dynamic steps.
    pub timestep: Option<f64>,
    pub ambient_temp: Option<f64>,
    pub location: Option<String>,
    pub triggers: Vec<Trigger>,
    pub label: Option<String>,
}

impl StepRecord {
    /// Triggers as `type:value` pairs joined by `"; "`, `-` for an unset value.
    pub fn triggers_text(&self) -> String {
        self.triggers
            .iter()
            .map(|t| match t.value {
                Some(v) => format!("{}:{v}", t.kind),
                None => format!("{}:-", t.kind),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Builds the step table for days already scheduled by an engine run.
///
/// Days that ran a drive cycle list its steps with segment repetitions
/// unrolled; a step's own repetitions stay in its row. Every day ends with
/// one idle row, which is the only row of unmatched and rejected days.
pub fn step_table(config: &CycleConfig, days: &[DaySummary], dynamic_dt: f64) -> Vec<StepRecord> {
    let index = CycleIndex::new(config);
    let mut rows: Vec<StepRecord> = Vec::new();

    for day in days {
        let drive_cycle = match day.status {
            DayStatus::Unmatched | DayStatus::Rejected => None,
            DayStatus::Padded | DayStatus::Overrun | DayStatus::Clipped => day
                .drive_cycle_id
                .as_deref()
                .and_then(|id| index.drive_cycle(id).ok()),
        };

        let mut last_segment: Option<&DriveCycleSegment> = None;
        for segment in drive_cycle.iter().flat_map(|dc| &dc.segments) {
            // a scheduled drive cycle never has dangling segments
            let Ok(sub) = index.sub_cycle(&segment.sub_cycle_id) else {
                continue;
            };
            for _ in 0..segment.repetitions {
                for (i, step) in sub.steps.iter().enumerate() {
                    let row = step_row(day, segment, &sub.id, i + 1, step, dynamic_dt);
                    push(&mut rows, row);
                }
            }
            last_segment = Some(segment);
        }

        push(&mut rows, idle_row(day, last_segment));
    }
    rows
}

fn push(rows: &mut Vec<StepRecord>, mut row: StepRecord) {
    row.global_index = rows.len() + 1;
    rows.push(row);
}

fn step_row(
    day: &DaySummary,
    segment: &DriveCycleSegment,
    sub_cycle_id: &str,
    position: usize,
    step: &Step,
    dynamic_dt: f64,
) -> StepRecord {
    StepRecord {
        global_index: 0,
        day_index: day.day_index,
        date: day.date,
        drive_cycle_id: day.drive_cycle_id.clone(),
        sub_cycle_id: sub_cycle_id.to_string(),
        sub_cycle_step_index: position,
        value: step.value.clone(),
        unit: step.unit.clone(),
        kind: if step.is_dynamic {
            StepKind::Dynamic
        } else {
            StepKind::Fixed
        },
        duration: step.duration,
        repetitions: step.effective_repetitions(),
        timestep: step.is_dynamic.then_some(dynamic_dt),
        ambient_temp: segment.ambient_temp,
        location: segment.location.clone(),
        triggers: step.triggers.clone(),
        label: step.label.clone(),
    }
}

fn idle_row(day: &DaySummary, last_segment: Option<&DriveCycleSegment>) -> StepRecord {
    StepRecord {
        global_index: 0,
        day_index: day.day_index,
        date: day.date,
        drive_cycle_id: day.drive_cycle_id.clone(),
        sub_cycle_id: IDLE_SUB_CYCLE.to_string(),
        sub_cycle_step_index: 1,
        value: StepValue::Number(0.0),
        unit: Unit::Amps,
        kind: StepKind::Idle,
        duration: day.idle_seconds,
        repetitions: 1,
        timestep: None,
        ambient_temp: last_segment.and_then(|s| s.ambient_temp),
        location: last_segment.and_then(|s| s.location.clone()),
        triggers: Vec::new(),
        label: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DaySource, Engine};
    use crate::model::{CalendarRule, DriveCycle, SubCycle};

    fn config() -> CycleConfig {
        let mut drive = DriveCycleSegment::new("drive", 2);
        drive.ambient_temp = Some(30.0);
        drive.location = Some("Lyon".to_string());
        let mut charge = Step::fixed(0.5, "C", 3600.0);
        charge.triggers = vec![
            Trigger {
                kind: "voltage_max".to_string(),
                value: Some(4.2),
            },
            Trigger {
                kind: "time_elapsed".to_string(),
                value: None,
            },
        ];
        charge.label = Some("CC charge".to_string());
        CycleConfig {
            sub_cycles: vec![
                SubCycle::new(
                    "drive",
                    vec![Step::dynamic(-10.0, "A", 60.0), Step::fixed(4.1, "V", 300.0)],
                ),
                SubCycle::new("charge", vec![charge]),
            ],
            drive_cycles: vec![DriveCycle::new(
                "DC1",
                vec![drive, DriveCycleSegment::new("charge", 1)],
            )],
            calendar_rules: vec![CalendarRule::weekdays(&[1], &["Mon"], "DC1")],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..CycleConfig::default()
        }
    }

    fn table() -> Vec<StepRecord> {
        let cfg = config();
        let report = Engine::default().run(&cfg);
        step_table(&cfg, &report.days, 0.1)
    }

    #[test]
    fn segment_repetitions_are_unrolled_and_days_end_idle() {
        let rows = table();
        let subs: Vec<(&str, usize)> = rows
            .iter()
            .map(|r| (r.sub_cycle_id.as_str(), r.sub_cycle_step_index))
            .collect();
        assert_eq!(
            subs,
            vec![
                ("drive", 1),
                ("drive", 2),
                ("drive", 1),
                ("drive", 2),
                ("charge", 1),
                ("idle", 1),
                ("idle", 1),
            ]
        );
        let indices: Vec<usize> = rows.iter().map(|r| r.global_index).collect();
        assert_eq!(indices, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn rows_carry_simulator_fields() {
        let rows = table();
        assert_eq!(rows[0].kind, StepKind::Dynamic);
        assert_eq!(rows[0].timestep, Some(0.1));
        assert_eq!(rows[0].ambient_temp, Some(30.0));
        assert_eq!(rows[0].location.as_deref(), Some("Lyon"));
        // voltage steps never reach the current profile but stay in the table
        assert_eq!(rows[1].unit, Unit::Volts);
        assert_eq!(rows[1].timestep, None);
        assert_eq!(rows[4].label.as_deref(), Some("CC charge"));
        assert_eq!(rows[4].triggers_text(), "voltage_max:4.2; time_elapsed:-");
        assert_eq!(rows[4].ambient_temp, None);
    }

    #[test]
    fn idle_row_covers_rest_of_day() {
        let rows = table();
        let idle = &rows[5];
        assert_eq!(idle.kind, StepKind::Idle);
        assert_eq!(idle.drive_cycle_id.as_deref(), Some("DC1"));
        // two 60 s drive steps and the charge; V steps add no active time
        assert_eq!(idle.duration, 86_400.0 - 120.0 - 3600.0);

        let unmatched = &rows[6];
        assert_eq!(unmatched.day_index, 1);
        assert_eq!(unmatched.drive_cycle_id, None);
        assert_eq!(unmatched.duration, 86_400.0);
    }

    #[test]
    fn rejected_days_hold_only_idle_row() {
        let cfg = config();
        let days = vec![DaySummary {
            day_index: 0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            drive_cycle_id: Some("DC1".to_string()),
            source: DaySource::Rule { index: 0 },
            active_seconds: 0.0,
            idle_seconds: 86_400.0,
            status: DayStatus::Rejected,
        }];
        let rows = step_table(&cfg, &days, 0.1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, StepKind::Idle);
    }
}
