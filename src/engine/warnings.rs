//! De-duplicated, ordered warning collection for one expansion run.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use crate::config::{DayOverflowPolicy, OutputPolicy};

/// Every distinct cause the engine can warn about.
///
/// Two warnings with equal kinds are the same warning: the collector keeps
/// only the first. Kinds that carry a date are therefore reported per day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WarningKind {
    MissingDates,
    InvertedDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    UnsupportedVoltageStep,
    UnknownUnit(String),
    InvalidValue(String),
    InvalidDuration,
    MissingSubCycle {
        drive_cycle: String,
        sub_cycle: String,
    },
    UnmatchedDay(NaiveDate),
    DayOverflow {
        drive_cycle: String,
        policy: DayOverflowPolicy,
    },
    RejectedDay {
        date: NaiveDate,
        drive_cycle: String,
    },
    OutputCapped {
        kept: usize,
        produced: usize,
        policy: OutputPolicy,
    },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDates => write!(f, "Missing startDate or endDate in config."),
            Self::InvertedDateRange { start, end } => write!(
                f,
                "endDate {end} is before startDate {start}, nothing to expand."
            ),
            Self::UnsupportedVoltageStep => write!(f, "Skipping constant V step (not supported)."),
            Self::UnknownUnit(unit) => write!(f, "Unknown unit {unit}, skipping."),
            Self::InvalidValue(value) => write!(f, "Non-numeric step value \"{value}\", skipping."),
            Self::InvalidDuration => write!(f, "Skipping step with negative or invalid duration."),
            Self::MissingSubCycle {
                drive_cycle,
                sub_cycle,
            } => write!(
                f,
                "Drive cycle {drive_cycle} references missing sub-cycle {sub_cycle}."
            ),
            Self::UnmatchedDay(date) => write!(f, "No DC for day {date}, skipping."),
            Self::DayOverflow {
                drive_cycle,
                policy: DayOverflowPolicy::Drift,
            } => write!(
                f,
                "Drive cycle {drive_cycle} is longer than one day; later days are shifted."
            ),
            Self::DayOverflow {
                drive_cycle,
                policy: DayOverflowPolicy::Truncate,
            } => write!(
                f,
                "Drive cycle {drive_cycle} is longer than one day; clipped at midnight."
            ),
            Self::DayOverflow {
                drive_cycle,
                policy: DayOverflowPolicy::Reject,
            } => write!(
                f,
                "Drive cycle {drive_cycle} is longer than one day; days using it are left idle."
            ),
            Self::RejectedDay { date, drive_cycle } => write!(
                f,
                "Drive cycle {drive_cycle} does not fit day {date}, skipping."
            ),
            Self::OutputCapped {
                kept,
                produced,
                policy: OutputPolicy::Truncate,
            } => write!(f, "Output truncated to {kept} of {produced} points."),
            Self::OutputCapped {
                kept,
                produced,
                policy: OutputPolicy::Downsample,
            } => write!(f, "Output downsampled to {kept} of {produced} points."),
        }
    }
}

/// Ordered warnings with explicit "already warned" state.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    seen: HashSet<WarningKind>,
    ordered: Vec<WarningKind>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `kind` unless an equal warning was already recorded.
    ///
    /// Returns `true` if the warning is new.
    pub fn emit(&mut self, kind: WarningKind) -> bool {
        if self.seen.contains(&kind) {
            return false;
        }
        self.seen.insert(kind.clone());
        self.ordered.push(kind);
        true
    }

    /// Returns `true` if an equal warning has been recorded.
    pub fn has_warned(&self, kind: &WarningKind) -> bool {
        self.seen.contains(kind)
    }

    /// Recorded kinds in emission order.
    pub fn kinds(&self) -> &[WarningKind] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Rendered messages in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.ordered.iter().map(ToString::to_string).collect()
    }
}
