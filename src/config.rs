//! TOML-based engine settings and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use crate::error::ConfigError;
use crate::error::LoadError;

/// Default upper bound on output samples for interactive preview.
pub const DEFAULT_MAX_POINTS: usize = 52_000;

/// Default timestep used to subdivide dynamic steps (seconds).
pub const DEFAULT_DYNAMIC_DT: f64 = 0.1;

/// Top-level engine settings parsed from TOML.
///
/// All fields have defaults matching the interactive preview. Load from
/// TOML with [`EngineConfig::from_toml_file`] or use
/// [`EngineConfig::preview`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Nominal cell/pack parameters used for unit conversion.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Step subdivision and day-boundary handling.
    #[serde(default)]
    pub expansion: ExpansionConfig,
    /// Output size bound.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Nominal parameters of the selected cell or pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nominal voltage (V), divides `W` step values.
    pub nominal_voltage: f64,
    /// Nominal capacity (Ah), multiplies `C` step values.
    pub nominal_capacity: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            nominal_voltage: 3.7,
            nominal_capacity: 5.0,
        }
    }
}

/// What to do when a day's drive cycle runs past 86,400 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOverflowPolicy {
    /// Keep every sample; the day runs long and later days shift.
    #[default]
    Drift,
    /// Clip samples at the day end.
    Truncate,
    /// Leave the day idle and warn.
    Reject,
}

impl fmt::Display for DayOverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drift => f.write_str("drift"),
            Self::Truncate => f.write_str("truncate"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Step subdivision and day-boundary handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Slice length for dynamic steps (seconds, > 0).
    pub dynamic_dt: f64,
    /// Policy for drive cycles longer than a day.
    pub day_overflow: DayOverflowPolicy,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            dynamic_dt: DEFAULT_DYNAMIC_DT,
            day_overflow: DayOverflowPolicy::Drift,
        }
    }
}

/// How the sample cap is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputPolicy {
    /// Stop appending once the cap is reached; the tail of the horizon is dropped.
    #[default]
    Truncate,
    /// Keep an evenly strided subset covering the whole horizon.
    Downsample,
}

impl fmt::Display for OutputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncate => f.write_str("truncate"),
            Self::Downsample => f.write_str("downsample"),
        }
    }
}

/// Output size bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Maximum number of `(time, current)` points (>= 2).
    pub max_points: usize,
    pub policy: OutputPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            policy: OutputPolicy::Truncate,
        }
    }
}

impl EngineConfig {
    /// Returns the interactive preview settings (3.7 V, 5 Ah, 52,000 points, truncation).
    pub fn preview() -> Self {
        Self::default()
    }

    /// Returns the overview preset: downsampled output spanning the whole horizon.
    pub fn overview() -> Self {
        Self {
            output: OutputConfig {
                policy: OutputPolicy::Downsample,
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the calendar-exact preset: over-long days are clipped so the
    /// time axis never drifts from the calendar.
    pub fn calendar_exact() -> Self {
        Self {
            expansion: ExpansionConfig {
                day_overflow: DayOverflowPolicy::Truncate,
                ..ExpansionConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["preview", "overview", "calendar_exact"];

    /// Loads settings from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "preview" => Ok(Self::preview()),
            "overview" => Ok(Self::overview()),
            "calendar_exact" => Ok(Self::calendar_exact()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(s)?)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the settings are valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let b = &self.battery;
        if !(b.nominal_voltage > 0.0 && b.nominal_voltage.is_finite()) {
            errors.push(ConfigError::new("battery.nominal_voltage", "must be > 0"));
        }
        if !(b.nominal_capacity > 0.0 && b.nominal_capacity.is_finite()) {
            errors.push(ConfigError::new("battery.nominal_capacity", "must be > 0"));
        }

        if !(self.expansion.dynamic_dt > 0.0 && self.expansion.dynamic_dt.is_finite()) {
            errors.push(ConfigError::new("expansion.dynamic_dt", "must be > 0"));
        }

        if self.output.max_points < 2 {
            errors.push(ConfigError::new("output.max_points", "must be >= 2"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_preset_valid() {
        let cfg = EngineConfig::preview();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "preview should be valid: {errors:?}");
        assert_eq!(cfg.output.max_points, 52_000);
        assert_eq!(cfg.expansion.dynamic_dt, 0.1);
    }

    #[test]
    fn from_preset_unknown() {
        let err = EngineConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in EngineConfig::PRESETS {
            let cfg = EngineConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn presets_differ_in_policy() {
        assert_eq!(EngineConfig::overview().output.policy, OutputPolicy::Downsample);
        assert_eq!(
            EngineConfig::calendar_exact().expansion.day_overflow,
            DayOverflowPolicy::Truncate
        );
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[battery]
nominal_voltage = 48.0
nominal_capacity = 100.0

[expansion]
dynamic_dt = 0.5
day_overflow = "reject"

[output]
max_points = 1000
policy = "downsample"
"#;
        let cfg = EngineConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.battery.nominal_voltage), Some(48.0));
        assert_eq!(
            cfg.as_ref().map(|c| c.expansion.day_overflow),
            Some(DayOverflowPolicy::Reject)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.output.policy),
            Some(OutputPolicy::Downsample)
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[output]
max_points = 10
bogus_field = true
"#;
        assert!(EngineConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[battery]
nominal_voltage = 400.0
"#;
        let cfg = EngineConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.battery.nominal_voltage), Some(400.0));
        // capacity kept default
        assert_eq!(cfg.as_ref().map(|c| c.battery.nominal_capacity), Some(5.0));
        assert_eq!(cfg.as_ref().map(|c| c.output.max_points), Some(52_000));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = EngineConfig::preview();
        cfg.battery.nominal_voltage = 0.0;
        cfg.expansion.dynamic_dt = -1.0;
        cfg.output.max_points = 1;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.nominal_voltage"));
        assert!(errors.iter().any(|e| e.field == "expansion.dynamic_dt"));
        assert!(errors.iter().any(|e| e.field == "output.max_points"));
    }
}
