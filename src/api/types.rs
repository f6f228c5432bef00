//! API request, query and response types.
//!
//! Field names are camelCase to match the cycle config JSON.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::{Granularity, RuleOverlap};
use crate::model::CycleConfig;

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of the expansion endpoints: a config plus optional overrides of
/// the server's default settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub config: CycleConfig,
    #[serde(default)]
    pub nominal_voltage: Option<f64>,
    #[serde(default)]
    pub nominal_capacity: Option<f64>,
    #[serde(default)]
    pub max_points: Option<usize>,
}

impl PreviewRequest {
    /// `base` with this request's overrides applied.
    pub fn settings(&self, base: &EngineConfig) -> EngineConfig {
        let mut settings = base.clone();
        if let Some(v) = self.nominal_voltage {
            settings.battery.nominal_voltage = v;
        }
        if let Some(c) = self.nominal_capacity {
            settings.battery.nominal_capacity = c;
        }
        if let Some(n) = self.max_points {
            settings.output.max_points = n;
        }
        settings
    }
}

/// Query parameters of `/periods` and `/slice`.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Defaults to `day`.
    pub granularity: Option<Granularity>,
    /// Zero-based period index; required by `/slice`.
    pub period: Option<usize>,
}

/// One period of the profile, times relative to the period start.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceResponse {
    pub label: String,
    pub time: Vec<f64>,
    pub current: Vec<f64>,
}

/// Single validation problem.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub field: String,
    pub message: String,
}

impl From<ConfigError> for ProblemRecord {
    fn from(e: ConfigError) -> Self {
        Self {
            field: e.field,
            message: e.message,
        }
    }
}

/// Result of `/validate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// `true` when `problems` is empty; overlaps alone do not invalidate.
    pub valid: bool,
    pub problems: Vec<ProblemRecord>,
    pub overlaps: Vec<RuleOverlap>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
