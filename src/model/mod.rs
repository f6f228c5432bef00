//! Declarative cycle configuration: steps, sub-cycles, drive cycles and calendar rules.

pub mod calendar;
pub mod cycle;
pub mod document;
pub mod step;

pub use calendar::{CalendarRule, DAYS_OF_WEEK, DayToken, FilterType, Months};
pub use cycle::{DriveCycle, DriveCycleSegment, SubCycle};
pub use document::CycleConfig;
pub use step::{Step, StepValue, Trigger, Unit};
