//! Whole-horizon expansion: days in order through one sequence builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::calendar;
use super::cycle::CycleExpander;
use super::index::CycleIndex;
use super::period::{self, Granularity, Period};
use super::schedule::{CalendarDay, DayScheduler, DaySummary, SECONDS_PER_DAY};
use super::sequence::{Profile, SequenceBuilder};
use super::stats::ProfileStats;
use super::step::{SkipTally, StepExpander};
use super::table::{self, StepRecord};
use super::warnings::{WarningKind, Warnings};
use crate::config::EngineConfig;
use crate::model::CycleConfig;

/// The `{ time, current, warnings }` payload handed to preview consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub time: Vec<f64>,
    pub current: Vec<f64>,
    pub warnings: Vec<String>,
}

/// Everything one run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReport {
    #[serde(flatten)]
    pub profile: Profile,
    /// De-duplicated warnings in the order they were raised.
    pub warnings: Vec<String>,
    pub days: Vec<DaySummary>,
    pub skipped: SkipTally,
    pub start_date: Option<NaiveDate>,
    pub total_days: usize,
}

impl ProfileReport {
    pub fn stats(&self) -> ProfileStats {
        ProfileStats::from_profile(&self.profile)
    }

    /// Period windows over the horizon; empty when the start date is unknown.
    pub fn periods(&self, granularity: Granularity) -> Vec<Period> {
        match self.start_date {
            Some(start) => period::periods(start, self.total_days, granularity),
            None => Vec::new(),
        }
    }

    /// The profile restricted to period `index`, rebased to its start.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn slice(&self, granularity: Granularity, index: usize) -> Option<(Period, Profile)> {
        let period = self.periods(granularity).into_iter().nth(index)?;
        let profile = self.profile.slice(&period);
        Some((period, profile))
    }

    pub fn preview(&self) -> Preview {
        Preview {
            time: self.profile.time.clone(),
            current: self.profile.current.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Expands cycle configs under fixed settings.
///
/// Each [`Engine::run`] is independent and deterministic: the same config
/// yields identical arrays.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    settings: EngineConfig,
}

impl Engine {
    pub fn new(settings: EngineConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Lists the declared steps of every day in `days`, as scheduled by a
    /// previous [`Engine::run`] of the same `config`.
    pub fn step_table(&self, config: &CycleConfig, days: &[DaySummary]) -> Vec<StepRecord> {
        let expansion = &self.settings.expansion;
        let steps = StepExpander::new(&self.settings.battery, expansion.dynamic_dt);
        table::step_table(config, days, steps.dynamic_dt())
    }

    /// Expands `config` over `[start_date, end_date]`.
    ///
    /// Never fails: configuration problems degrade to warnings and a
    /// best-effort profile. Missing or inverted dates yield only `(0, 0)`.
    pub fn run(&self, config: &CycleConfig) -> ProfileReport {
        let mut warnings = Warnings::new();
        let mut builder = SequenceBuilder::new(&self.settings.output);

        let (start, end) = match (config.start_date, config.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warnings.emit(WarningKind::MissingDates);
                return finish(builder, warnings, ProfileReport::default());
            }
        };
        if end < start {
            warnings.emit(WarningKind::InvertedDateRange { start, end });
            let report = ProfileReport {
                start_date: Some(start),
                ..ProfileReport::default()
            };
            return finish(builder, warnings, report);
        }
        let total_days = config.total_days().unwrap_or(0);

        let expansion = &self.settings.expansion;
        let steps = StepExpander::new(&self.settings.battery, expansion.dynamic_dt);
        let mut cycles = CycleExpander::new(CycleIndex::new(config), steps);
        let scheduler = DayScheduler::new(expansion.day_overflow);
        let default_id = config.default_id();

        let mut days = Vec::with_capacity(total_days);
        for (index, date) in start.iter_days().take(total_days).enumerate() {
            let resolution = calendar::resolve(date, &config.calendar_rules, default_id);
            let plan = scheduler.plan_day(
                CalendarDay { index, date },
                resolution,
                &mut cycles,
                &mut warnings,
            );

            let day_end = builder.clock() + SECONDS_PER_DAY;
            for sample in plan.samples() {
                builder.append(sample);
            }
            builder.pad_to(day_end);

            trace!(
                day = index,
                %date,
                drive_cycle = plan.summary.drive_cycle_id.as_deref().unwrap_or("-"),
                status = %plan.summary.status,
                clock = builder.clock(),
                "scheduled day"
            );
            days.push(plan.summary);
        }

        let report = ProfileReport {
            days,
            skipped: cycles.skipped().clone(),
            start_date: Some(start),
            total_days,
            ..ProfileReport::default()
        };
        finish(builder, warnings, report)
    }
}

fn finish(
    builder: SequenceBuilder,
    mut warnings: Warnings,
    mut report: ProfileReport,
) -> ProfileReport {
    let produced = builder.produced();
    let (profile, capped) = builder.finish();
    if let Some(kind) = capped {
        warnings.emit(kind);
    }
    debug!(
        days = report.total_days,
        produced,
        kept = profile.len(),
        warnings = warnings.len(),
        skipped = report.skipped.total(),
        "expansion finished"
    );
    report.profile = profile;
    report.warnings = warnings.messages();
    report
}
