//! Step expansion: unit conversion and time discretisation of one step.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::warnings::{WarningKind, Warnings};
use crate::config::{BatteryConfig, DEFAULT_DYNAMIC_DT};
use crate::model::{Step, Unit};

/// One `(Δt, current)` pair: `current` amperes held for `dt` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub dt: f64,
    pub current: f64,
}

impl Sample {
    pub fn new(dt: f64, current: f64) -> Self {
        Self { dt, current }
    }
}

/// Why a step produced no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The converted current is exactly zero.
    Explicit,
    /// `V` steps cannot be expressed as a current profile.
    UnsupportedUnit,
    UnknownUnit,
    /// The value is not a finite number.
    InvalidValue,
    /// `duration * repetitions` is zero.
    ZeroDuration,
    /// `duration * repetitions` is negative or not finite.
    InvalidDuration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explicit => "zero current",
            Self::UnsupportedUnit => "unsupported unit",
            Self::UnknownUnit => "unknown unit",
            Self::InvalidValue => "invalid value",
            Self::ZeroDuration => "zero duration",
            Self::InvalidDuration => "invalid duration",
        };
        f.pad(s)
    }
}

/// Count of skipped steps per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipTally(BTreeMap<SkipReason, usize>);

impl SkipTally {
    pub fn add(&mut self, reason: SkipReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    /// Adds every count of `other` to `self`.
    pub fn merge(&mut self, other: &SkipTally) {
        for (reason, n) in &other.0 {
            *self.0.entry(*reason).or_insert(0) += n;
        }
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.0.iter().map(|(r, n)| (*r, *n))
    }
}

/// Result of expanding a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepExpansion {
    Samples(Vec<Sample>),
    Skipped(SkipReason),
}

/// Converts steps to samples using fixed nominal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepExpander {
    nominal_voltage: f64,
    nominal_capacity: f64,
    dynamic_dt: f64,
}

impl Default for StepExpander {
    fn default() -> Self {
        Self::new(&BatteryConfig::default(), DEFAULT_DYNAMIC_DT)
    }
}

impl StepExpander {
    /// Creates an expander for the given battery and dynamic timestep.
    ///
    /// A non-positive or non-finite `dynamic_dt` falls back to
    /// [`DEFAULT_DYNAMIC_DT`].
    pub fn new(battery: &BatteryConfig, dynamic_dt: f64) -> Self {
        let dynamic_dt = if dynamic_dt > 0.0 && dynamic_dt.is_finite() {
            dynamic_dt
        } else {
            DEFAULT_DYNAMIC_DT
        };
        Self {
            nominal_voltage: battery.nominal_voltage,
            nominal_capacity: battery.nominal_capacity,
            dynamic_dt,
        }
    }

    pub fn dynamic_dt(&self) -> f64 {
        self.dynamic_dt
    }

    /// Converts the step value to amperes.
    ///
    /// Unit problems are reported to `warnings` once per cause.
    pub fn current(&self, step: &Step, warnings: &mut Warnings) -> Result<f64, SkipReason> {
        let value = || {
            step.value
                .as_f64()
                .ok_or_else(|| WarningKind::InvalidValue(step.value.to_string()))
        };
        let converted = match &step.unit {
            Unit::Amps => value(),
            Unit::Watts => value().map(|v| v / self.nominal_voltage),
            Unit::CRate => value().map(|v| v * self.nominal_capacity),
            Unit::Volts => {
                warnings.emit(WarningKind::UnsupportedVoltageStep);
                return Err(SkipReason::UnsupportedUnit);
            }
            Unit::Other(unit) => {
                warnings.emit(WarningKind::UnknownUnit(unit.clone()));
                return Err(SkipReason::UnknownUnit);
            }
        };
        converted.map_err(|kind| {
            warnings.emit(kind);
            SkipReason::InvalidValue
        })
    }

    /// Expands one step into samples whose durations sum to
    /// `duration * repetitions`.
    pub fn expand(&self, step: &Step, warnings: &mut Warnings) -> StepExpansion {
        let mut out = Vec::new();
        match self.expand_into(step, &mut out, warnings) {
            Ok(()) => StepExpansion::Samples(out),
            Err(reason) => StepExpansion::Skipped(reason),
        }
    }

    /// Appends the step's samples to `out`.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the step contributes nothing; `out`
    /// is left untouched in that case.
    pub fn expand_into(
        &self,
        step: &Step,
        out: &mut Vec<Sample>,
        warnings: &mut Warnings,
    ) -> Result<(), SkipReason> {
        let total = step.total_duration();
        if total == 0.0 {
            return Err(SkipReason::ZeroDuration);
        }
        if !(total > 0.0 && total.is_finite()) {
            warnings.emit(WarningKind::InvalidDuration);
            return Err(SkipReason::InvalidDuration);
        }

        let current = self.current(step, warnings)?;
        if current == 0.0 {
            return Err(SkipReason::Explicit);
        }

        if !step.is_dynamic {
            out.push(Sample::new(total, current));
            return Ok(());
        }

        let dt = self.dynamic_dt;
        let (slices, remainder) = subdivide(total, dt);
        out.reserve(slices + 1);
        out.extend(std::iter::repeat_n(Sample::new(dt, current), slices));
        if remainder > 0.0 {
            out.push(Sample::new(remainder, current));
        }
        Ok(())
    }
}

/// Relative tolerance when splitting a duration into `dt` slices.
const SLICE_EPSILON: f64 = 1e-9;

/// Splits `total` into whole `dt` slices and a trailing remainder.
///
/// A remainder within rounding error of zero is dropped and one within
/// rounding error of `dt` counts as another full slice, so `1.0 / 0.1`
/// gives ten slices and no remainder.
fn subdivide(total: f64, dt: f64) -> (usize, f64) {
    let mut slices = (total / dt).floor();
    let mut remainder = total - slices * dt;
    let tolerance = SLICE_EPSILON * total.max(dt);
    if (remainder - dt).abs() <= tolerance || remainder > dt {
        slices += 1.0;
        remainder = 0.0;
    } else if remainder.abs() <= tolerance {
        remainder = 0.0;
    }
    (slices as usize, remainder.max(0.0))
}
