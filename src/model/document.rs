//! The top-level cycle configuration document and its validation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::calendar::{CalendarRule, DayToken, FilterType};
use super::cycle::{DriveCycle, SubCycle};
use crate::error::{ConfigError, LoadError};

/// Ambient temperature range accepted for drive-cycle segments (°C).
pub const AMBIENT_TEMP_RANGE: (f64, f64) = (-50.0, 100.0);

/// Everything needed to expand a multi-day current profile.
///
/// Produced by the editing and import layers and treated as read-only by
/// the engine. Field names follow the editor's camelCase JSON shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleConfig {
    #[serde(default)]
    pub sub_cycles: Vec<SubCycle>,
    #[serde(default)]
    pub drive_cycles: Vec<DriveCycle>,
    /// Evaluated in declaration order; the first match wins.
    #[serde(default)]
    pub calendar_rules: Vec<CalendarRule>,
    #[serde(default)]
    pub default_drive_cycle_id: Option<String>,
    /// Blank or `null` in the document means unset.
    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CycleConfig {
    /// Parses a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the text is not a valid config document.
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a config JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Pretty-printed JSON, the format of the rules download.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if a value cannot be represented in JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The default drive-cycle id, if one is set and non-blank.
    pub fn default_id(&self) -> Option<&str> {
        self.default_drive_cycle_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Number of calendar days in `[start_date, end_date]`.
    ///
    /// Returns `None` when either date is missing and `Some(0)` when the
    /// range is inverted.
    pub fn total_days(&self) -> Option<usize> {
        let (start, end) = (self.start_date?, self.end_date?);
        let days = (end - start).num_days() + 1;
        Some(usize::try_from(days).unwrap_or(0))
    }

    /// Checks the document for structural problems and returns all of them.
    ///
    /// The engine never requires this to pass: it degrades to warnings on
    /// the same problems. Validation exists for tooling that wants to reject
    /// a document up front.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => errors.push(ConfigError::new(
                "endDate",
                format!("must not be before startDate ({start})"),
            )),
            (None, _) => errors.push(ConfigError::new("startDate", "is required")),
            (_, None) => errors.push(ConfigError::new("endDate", "is required")),
            _ => {}
        }

        let sub_ids = unique_ids(
            self.sub_cycles.iter().map(|s| s.id.as_str()),
            "subCycles",
            &mut errors,
        );
        let dc_ids = unique_ids(
            self.drive_cycles.iter().map(|d| d.id.as_str()),
            "driveCycles",
            &mut errors,
        );

        for (i, sub) in self.sub_cycles.iter().enumerate() {
            for (j, step) in sub.steps.iter().enumerate() {
                let field = format!("subCycles[{i}].steps[{j}]");
                if step.repetitions < 1 {
                    errors.push(ConfigError::new(format!("{field}.repetitions"), "must be >= 1"));
                }
                if !(step.duration >= 0.0) {
                    errors.push(ConfigError::new(format!("{field}.duration"), "must be >= 0"));
                }
                if step.value.as_f64().is_none() {
                    errors.push(ConfigError::new(
                        format!("{field}.value"),
                        format!("\"{}\" is not a number", step.value),
                    ));
                }
            }
        }

        for (i, dc) in self.drive_cycles.iter().enumerate() {
            for (j, seg) in dc.segments.iter().enumerate() {
                let field = format!("driveCycles[{i}].segments[{j}]");
                if !sub_ids.contains(seg.sub_cycle_id.as_str()) {
                    errors.push(ConfigError::new(
                        format!("{field}.subCycleId"),
                        format!("unknown sub-cycle \"{}\"", seg.sub_cycle_id),
                    ));
                }
                if seg.repetitions < 1 {
                    errors.push(ConfigError::new(format!("{field}.repetitions"), "must be >= 1"));
                }
                if let Some(t) = seg.ambient_temp {
                    let (lo, hi) = AMBIENT_TEMP_RANGE;
                    if !(lo..=hi).contains(&t) {
                        errors.push(ConfigError::new(
                            format!("{field}.ambientTemp"),
                            format!("must be in [{lo}, {hi}] °C"),
                        ));
                    }
                }
            }
        }

        for (i, rule) in self.calendar_rules.iter().enumerate() {
            validate_rule(rule, &format!("calendarRules[{i}]"), &dc_ids, &mut errors);
        }

        if let Some(id) = self.default_id() {
            if !dc_ids.contains(id) {
                errors.push(ConfigError::new(
                    "defaultDriveCycleId",
                    format!("unknown drive cycle \"{id}\""),
                ));
            }
        }

        errors
    }
}

fn unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    field: &str,
    errors: &mut Vec<ConfigError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for (i, id) in ids.enumerate() {
        if !seen.insert(id) {
            errors.push(ConfigError::new(
                format!("{field}[{i}].id"),
                format!("duplicate id \"{id}\""),
            ));
        }
    }
    seen
}

fn optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| <D::Error as de::Error>::custom(format!("invalid date \"{s}\": {e}"))),
        _ => Ok(None),
    }
}

fn validate_rule(
    rule: &CalendarRule,
    field: &str,
    dc_ids: &HashSet<&str>,
    errors: &mut Vec<ConfigError>,
) {
    if rule.months.is_empty() {
        errors.push(ConfigError::new(
            format!("{field}.months"),
            "at least one month must be selected",
        ));
    }
    if let Some(m) = rule.months.iter().find(|m| !(1..=12).contains(*m)) {
        errors.push(ConfigError::new(
            format!("{field}.months"),
            format!("month {m} is outside 1-12"),
        ));
    }
    for token in rule.months.unparsed() {
        errors.push(ConfigError::new(
            format!("{field}.months"),
            format!("invalid month \"{token}\""),
        ));
    }
    if rule.days_or_dates.is_empty() {
        errors.push(ConfigError::new(
            format!("{field}.daysOrDates"),
            "either weekdays or dates must be provided",
        ));
    }
    for token in &rule.days_or_dates {
        let problem = match (rule.filter_type, token) {
            (FilterType::Weekday, DayToken::Weekday(_)) if token.is_known_weekday() => None,
            (FilterType::Weekday, _) => Some(format!("invalid weekday \"{token}\"")),
            (FilterType::Date, DayToken::Date(d)) if (1..=31).contains(d) => None,
            (FilterType::Date, DayToken::Date(d)) => Some(format!("date {d} is outside 1-31")),
            (FilterType::Date, DayToken::Weekday(_)) => Some(format!("invalid date \"{token}\"")),
        };
        if let Some(message) = problem {
            errors.push(ConfigError::new(format!("{field}.daysOrDates"), message));
        }
    }
    if !dc_ids.contains(rule.drive_cycle_id.as_str()) {
        errors.push(ConfigError::new(
            format!("{field}.driveCycleId"),
            format!("unknown drive cycle \"{}\"", rule.drive_cycle_id),
        ));
    }
}
