//! Per-day scheduling: resolve, expand, then pad, clip or reject.

use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::{DaySource, Resolution};
use super::cycle::{CycleExpander, Expansion};
use super::step::Sample;
use super::warnings::{WarningKind, Warnings};
use crate::config::DayOverflowPolicy;

/// Length of one calendar day in the output time axis.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Drive cycles within this many seconds of a full day count as fitting.
const OVERFLOW_TOLERANCE: f64 = 1e-6;

/// One day of the simulation horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    /// Zero-based position in the horizon.
    pub index: usize,
    pub date: NaiveDate,
}

/// How a day's samples relate to the 86,400 s slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Drive cycle fits; the rest of the day is idle.
    Padded,
    /// Drive cycle is longer than a day and kept whole.
    Overrun,
    /// Drive cycle is longer than a day and cut at the day end.
    Clipped,
    /// Drive cycle is longer than a day; the day is left idle.
    Rejected,
    /// No drive cycle could be expanded; the day is idle.
    Unmatched,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Padded => "padded",
            Self::Overrun => "overrun",
            Self::Clipped => "clipped",
            Self::Rejected => "rejected",
            Self::Unmatched => "unmatched",
        };
        f.write_str(s)
    }
}

/// Assignment and time accounting of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day_index: usize,
    pub date: NaiveDate,
    pub drive_cycle_id: Option<String>,
    pub source: DaySource,
    /// Seconds covered by drive-cycle samples.
    pub active_seconds: f64,
    /// Zero-current padding added to complete the day.
    pub idle_seconds: f64,
    pub status: DayStatus,
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Day {:>4}  {}  {:<12} {:<10} active {:>9.1} s  idle {:>9.1} s  {}",
            self.day_index + 1,
            self.date,
            self.drive_cycle_id.as_deref().unwrap_or("-"),
            self.source.to_string(),
            self.active_seconds,
            self.idle_seconds,
            self.status
        )
    }
}

/// Samples selected for one day, before idle padding.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub summary: DaySummary,
    expansion: Option<Rc<Expansion>>,
    keep: usize,
    tail: Option<Sample>,
}

impl DayPlan {
    /// The day's samples in order. Padding is added by the sequence builder.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        let kept: &[Sample] = match &self.expansion {
            Some(e) => &e.samples[..self.keep],
            None => &[],
        };
        kept.iter().copied().chain(self.tail)
    }

    fn idle(
        day: CalendarDay,
        drive_cycle_id: Option<&str>,
        source: DaySource,
        status: DayStatus,
    ) -> Self {
        Self {
            summary: DaySummary {
                day_index: day.index,
                date: day.date,
                drive_cycle_id: drive_cycle_id.map(str::to_string),
                source,
                active_seconds: 0.0,
                idle_seconds: SECONDS_PER_DAY,
                status,
            },
            expansion: None,
            keep: 0,
            tail: None,
        }
    }
}

/// Turns resolved days into sample plans under one overflow policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayScheduler {
    policy: DayOverflowPolicy,
}

impl DayScheduler {
    pub fn new(policy: DayOverflowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DayOverflowPolicy {
        self.policy
    }

    /// Plans one day.
    ///
    /// A day whose drive cycle is absent or cannot be expanded becomes one
    /// idle day with a dated warning. Nothing here is fatal.
    pub fn plan_day(
        &self,
        day: CalendarDay,
        resolution: Resolution<'_>,
        cycles: &mut CycleExpander<'_>,
        warnings: &mut Warnings,
    ) -> DayPlan {
        let Some(id) = resolution.drive_cycle_id else {
            warnings.emit(WarningKind::UnmatchedDay(day.date));
            return DayPlan::idle(day, None, resolution.source, DayStatus::Unmatched);
        };

        let expansion = match cycles.expand_drive_cycle(id, warnings) {
            Ok(e) => e,
            Err(_) => {
                warnings.emit(WarningKind::UnmatchedDay(day.date));
                return DayPlan::idle(day, Some(id), resolution.source, DayStatus::Unmatched);
            }
        };

        let duration = expansion.duration;
        if duration <= SECONDS_PER_DAY + OVERFLOW_TOLERANCE {
            return Self::planned(day, id, resolution.source, expansion, DayStatus::Padded);
        }

        warnings.emit(WarningKind::DayOverflow {
            drive_cycle: id.to_string(),
            policy: self.policy,
        });
        match self.policy {
            DayOverflowPolicy::Drift => {
                Self::planned(day, id, resolution.source, expansion, DayStatus::Overrun)
            }
            DayOverflowPolicy::Truncate => Self::clipped(day, id, resolution.source, expansion),
            DayOverflowPolicy::Reject => {
                warnings.emit(WarningKind::RejectedDay {
                    date: day.date,
                    drive_cycle: id.to_string(),
                });
                DayPlan::idle(day, Some(id), resolution.source, DayStatus::Rejected)
            }
        }
    }

    fn planned(
        day: CalendarDay,
        id: &str,
        source: DaySource,
        expansion: Rc<Expansion>,
        status: DayStatus,
    ) -> DayPlan {
        let active = expansion.duration;
        DayPlan {
            summary: DaySummary {
                day_index: day.index,
                date: day.date,
                drive_cycle_id: Some(id.to_string()),
                source,
                active_seconds: active,
                idle_seconds: (SECONDS_PER_DAY - active).max(0.0),
                status,
            },
            keep: expansion.samples.len(),
            expansion: Some(expansion),
            tail: None,
        }
    }

    // Keeps whole samples up to the day end and shortens the one that
    // straddles it.
    fn clipped(day: CalendarDay, id: &str, source: DaySource, expansion: Rc<Expansion>) -> DayPlan {
        let mut elapsed = 0.0;
        let mut keep = 0;
        for s in &expansion.samples {
            if elapsed + s.dt > SECONDS_PER_DAY {
                break;
            }
            elapsed += s.dt;
            keep += 1;
        }
        let remaining = SECONDS_PER_DAY - elapsed;
        let tail = expansion
            .samples
            .get(keep)
            .filter(|_| remaining > OVERFLOW_TOLERANCE)
            .map(|s| Sample::new(remaining, s.current));

        DayPlan {
            summary: DaySummary {
                day_index: day.index,
                date: day.date,
                drive_cycle_id: Some(id.to_string()),
                source,
                active_seconds: SECONDS_PER_DAY,
                idle_seconds: 0.0,
                status: DayStatus::Clipped,
            },
            expansion: Some(expansion),
            keep,
            tail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::index::CycleIndex;
    use crate::engine::step::StepExpander;
    use crate::model::{CycleConfig, DriveCycle, DriveCycleSegment, Step, SubCycle};

    fn config() -> CycleConfig {
        CycleConfig {
            sub_cycles: vec![
                SubCycle::new("short", vec![Step::fixed(10.0, "A", 3600.0)]),
                SubCycle::new(
                    "long",
                    vec![
                        Step::fixed(5.0, "A", 50_000.0),
                        Step::fixed(-5.0, "A", 50_000.0),
                    ],
                ),
            ],
            drive_cycles: vec![
                DriveCycle::new("SHORT", vec![DriveCycleSegment::new("short", 1)]),
                DriveCycle::new("LONG", vec![DriveCycleSegment::new("long", 1)]),
                DriveCycle::new("BROKEN", vec![DriveCycleSegment::new("missing", 1)]),
            ],
            ..CycleConfig::default()
        }
    }

    fn day() -> CalendarDay {
        CalendarDay {
            index: 0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn resolved(id: &str) -> Resolution<'_> {
        Resolution {
            drive_cycle_id: Some(id),
            source: DaySource::Default,
        }
    }

    fn plan(policy: DayOverflowPolicy, id: &str, w: &mut Warnings) -> DayPlan {
        let cfg = config();
        let mut cycles = CycleExpander::new(CycleIndex::new(&cfg), StepExpander::default());
        DayScheduler::new(policy).plan_day(day(), resolved(id), &mut cycles, w)
    }

    #[test]
    fn fitting_cycle_is_padded() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Drift, "SHORT", &mut w);
        assert_eq!(p.summary.status, DayStatus::Padded);
        assert_eq!(p.summary.active_seconds, 3600.0);
        assert_eq!(p.summary.idle_seconds, 82_800.0);
        assert_eq!(p.samples().collect::<Vec<_>>(), vec![Sample::new(3600.0, 10.0)]);
        assert!(w.is_empty());
    }

    #[test]
    fn unmatched_day_is_idle_with_warning() {
        let mut w = Warnings::new();
        let cfg = config();
        let mut cycles = CycleExpander::new(CycleIndex::new(&cfg), StepExpander::default());
        let unmatched = Resolution {
            drive_cycle_id: None,
            source: DaySource::Unmatched,
        };
        let p = DayScheduler::default().plan_day(day(), unmatched, &mut cycles, &mut w);
        assert_eq!(p.summary.status, DayStatus::Unmatched);
        assert_eq!(p.samples().count(), 0);
        assert_eq!(p.summary.idle_seconds, SECONDS_PER_DAY);
        assert_eq!(w.messages(), vec!["No DC for day 2024-01-01, skipping.".to_string()]);
    }

    #[test]
    fn dangling_drive_cycle_is_unmatched() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Drift, "NOPE", &mut w);
        assert_eq!(p.summary.status, DayStatus::Unmatched);
        assert_eq!(p.summary.drive_cycle_id.as_deref(), Some("NOPE"));
        assert!(w.has_warned(&WarningKind::UnmatchedDay(day().date)));
    }

    #[test]
    fn missing_sub_cycle_makes_day_unmatched() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Drift, "BROKEN", &mut w);
        assert_eq!(p.summary.status, DayStatus::Unmatched);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn drift_keeps_overlong_cycle() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Drift, "LONG", &mut w);
        assert_eq!(p.summary.status, DayStatus::Overrun);
        assert_eq!(p.summary.idle_seconds, 0.0);
        let total: f64 = p.samples().map(|s| s.dt).sum();
        assert_eq!(total, 100_000.0);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn truncate_clips_straddling_sample() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Truncate, "LONG", &mut w);
        assert_eq!(p.summary.status, DayStatus::Clipped);
        assert_eq!(
            p.samples().collect::<Vec<_>>(),
            vec![Sample::new(50_000.0, 5.0), Sample::new(36_400.0, -5.0)]
        );
    }

    #[test]
    fn reject_leaves_day_idle() {
        let mut w = Warnings::new();
        let p = plan(DayOverflowPolicy::Reject, "LONG", &mut w);
        assert_eq!(p.summary.status, DayStatus::Rejected);
        assert_eq!(p.samples().count(), 0);
        assert!(w.has_warned(&WarningKind::RejectedDay {
            date: day().date,
            drive_cycle: "LONG".to_string(),
        }));
    }
}
