//! The expansion pipeline, leaves first:
//!
//! step → sub-cycle → drive cycle → calendar day → sequence → periods.
//! The step table reads the same schedule back at step granularity.

pub mod calendar;
pub mod cycle;
pub mod index;
pub mod period;
pub mod pipeline;
pub mod schedule;
pub mod sequence;
pub mod stats;
pub mod step;
pub mod table;
pub mod warnings;

pub use calendar::{DaySource, Resolution, RuleOverlap, find_overlaps, resolve};
pub use cycle::{CycleExpander, Expansion};
pub use index::CycleIndex;
pub use period::{Granularity, Period, periods};
pub use pipeline::{Engine, Preview, ProfileReport};
pub use schedule::{CalendarDay, DayScheduler, DayStatus, DaySummary, SECONDS_PER_DAY};
pub use sequence::{Profile, SequenceBuilder};
pub use stats::ProfileStats;
pub use step::{Sample, SkipReason, SkipTally, StepExpander, StepExpansion};
pub use table::{IDLE_SUB_CYCLE, StepKind, StepRecord, step_table};
pub use warnings::{WarningKind, Warnings};
