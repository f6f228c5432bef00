//! Operating steps: the leaves of the drive-cycle hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Physical quantity a step's value is expressed in.
///
/// Unrecognised unit strings are preserved in [`Unit::Other`] so that the
/// expander can report them instead of failing to load the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    /// Current in amperes (`"A"`).
    #[default]
    Amps,
    /// Power in watts (`"W"`), converted through the nominal voltage.
    Watts,
    /// C-rate (`"C"`), converted through the nominal capacity.
    CRate,
    /// Constant voltage (`"V"`). Declared by the editor, not expandable.
    Volts,
    /// Any other unit string.
    Other(String),
}

impl Unit {
    /// The unit symbol as it appears in a config document.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Amps => "A",
            Self::Watts => "W",
            Self::CRate => "C",
            Self::Volts => "V",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Unit {
    fn from(s: String) -> Self {
        match s.as_str() {
            "A" => Self::Amps,
            "W" => Self::Watts,
            "C" => Self::CRate,
            "V" => Self::Volts,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Unit {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Other(s) => s,
            known => known.symbol().to_string(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A step value as stored by the editing layer: a number or numeric text.
///
/// An unset value (`null` or an absent field) loads as `Missing` and the
/// step is skipped at expansion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Number(f64),
    Text(String),
    Missing,
}

impl StepValue {
    /// Returns the value as a finite number, or `None` if it is not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        v.is_finite().then_some(v)
    }
}

impl Default for StepValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for StepValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl fmt::Display for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("null"),
        }
    }
}

/// Early-termination condition attached to a step.
///
/// Carried through serialization for the downstream simulator; the
/// expansion engine never evaluates triggers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger type, e.g. `"voltage_above"` or `"time_elapsed"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Threshold value; `null` means the simulator default.
    #[serde(default)]
    pub value: Option<f64>,
}

/// One constant-value operating segment, optionally repeated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Magnitude in `unit`.
    #[serde(default = "missing_value")]
    pub value: StepValue,
    /// Unit of `value`.
    pub unit: Unit,
    /// Duration of a single repetition in seconds.
    pub duration: f64,
    /// Number of back-to-back repetitions (>= 1).
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// Expand into fine fixed-timestep samples instead of one coarse sample.
    #[serde(default)]
    pub is_dynamic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Editor fields the engine does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub(crate) fn default_repetitions() -> u32 {
    1
}

fn missing_value() -> StepValue {
    StepValue::Missing
}

impl Step {
    /// A fixed (single-sample) step repeated once.
    pub fn fixed(value: f64, unit: impl Into<Unit>, duration: f64) -> Self {
        Self {
            value: StepValue::Number(value),
            unit: unit.into(),
            duration,
            repetitions: 1,
            ..Self::default()
        }
    }

    /// A dynamic step, subdivided into fixed timesteps on expansion.
    pub fn dynamic(value: f64, unit: impl Into<Unit>, duration: f64) -> Self {
        Self {
            is_dynamic: true,
            ..Self::fixed(value, unit, duration)
        }
    }

    /// Returns the step with its repetition count replaced.
    pub fn repeated(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Effective repetition count; zero is treated as a single run.
    pub fn effective_repetitions(&self) -> u32 {
        self.repetitions.max(1)
    }

    /// `duration * repetitions`, the time this step occupies once expanded.
    pub fn total_duration(&self) -> f64 {
        self.duration * f64::from(self.effective_repetitions())
    }
}
