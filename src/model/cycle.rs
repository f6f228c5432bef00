//! Reusable sub-cycles and the composite drive cycles built from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::step::{Step, default_repetitions};

/// A named, reusable sequence of steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCycle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubCycle {
    pub fn new(id: impl Into<String>, steps: Vec<Step>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            steps,
            ..Self::default()
        }
    }
}

/// One row of a drive cycle's composition: a sub-cycle run `repetitions` times.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveCycleSegment {
    /// Id of the referenced [`SubCycle`].
    pub sub_cycle_id: String,
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// Ambient temperature in °C for the simulator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveCycleSegment {
    pub fn new(sub_cycle_id: impl Into<String>, repetitions: u32) -> Self {
        Self {
            sub_cycle_id: sub_cycle_id.into(),
            repetitions,
            ..Self::default()
        }
    }
}

/// A named composition of sub-cycle segments, typically one day's duty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveCycle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub segments: Vec<DriveCycleSegment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveCycle {
    pub fn new(id: impl Into<String>, segments: Vec<DriveCycleSegment>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            segments,
            ..Self::default()
        }
    }
}
