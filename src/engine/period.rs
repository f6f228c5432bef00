//! Day, month and year windows over the output time axis.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::schedule::SECONDS_PER_DAY;
use crate::error::ParseGranularityError;

/// Bucket size for period windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Day, Self::Month, Self::Year];

    fn key(self, date: NaiveDate) -> (i32, u32, u32) {
        match self {
            Self::Day => (date.year(), date.month(), date.day()),
            Self::Month => (date.year(), date.month(), 0),
            Self::Year => (date.year(), 0, 0),
        }
    }

    fn label(self, date: NaiveDate) -> String {
        let pattern = match self {
            Self::Day => "%b %d, %Y",
            Self::Month => "%b %Y",
            Self::Year => "%Y",
        };
        date.format(pattern).to_string()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => f.write_str("day"),
            Self::Month => f.write_str("month"),
            Self::Year => f.write_str("year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ParseGranularityError(s.to_string())),
        }
    }
}

/// A labelled `[start_time, end_time)` window in seconds from the horizon start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Period {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

/// Splits `total_days` days from `start` into contiguous periods.
///
/// Boundaries sit at `86400 × dayIndex`, so a drifting day does not move
/// them. The last period ends at `total_days × 86400`.
pub fn periods(start: NaiveDate, total_days: usize, granularity: Granularity) -> Vec<Period> {
    let mut out: Vec<Period> = Vec::new();
    let mut current_key = None;

    for (i, date) in start.iter_days().take(total_days).enumerate() {
        let key = granularity.key(date);
        if current_key == Some(key) {
            continue;
        }
        let boundary = i as f64 * SECONDS_PER_DAY;
        if let Some(last) = out.last_mut() {
            last.end_time = boundary;
        }
        out.push(Period {
            label: granularity.label(date),
            start_time: boundary,
            end_time: boundary,
        });
        current_key = Some(key);
    }

    if let Some(last) = out.last_mut() {
        last.end_time = total_days as f64 * SECONDS_PER_DAY;
    }
    out
}
