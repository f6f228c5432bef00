//! Calendar rules assigning drive cycles to days.

use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Weekday abbreviations in the form rules refer to them.
pub const DAYS_OF_WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// What a rule's `daysOrDates` list filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Weekday,
    Date,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekday => f.write_str("weekday"),
            Self::Date => f.write_str("date"),
        }
    }
}

/// One entry of a rule's `daysOrDates` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DayToken {
    /// Day of month (1–31).
    Date(u32),
    /// Weekday name, normalised to leading-capital form (`"Mon"`).
    Weekday(String),
}

impl DayToken {
    /// Parses one token: integers become dates, anything else a weekday name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<u32>() {
            Ok(n) => Self::Date(n),
            Err(_) => Self::Weekday(capitalize_words(raw)),
        }
    }

    /// Returns `true` for a weekday token naming a real weekday.
    pub fn is_known_weekday(&self) -> bool {
        matches!(self, Self::Weekday(w) if DAYS_OF_WEEK.contains(&w.as_str()))
    }
}

impl fmt::Display for DayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(n) => write!(f, "{n}"),
            Self::Weekday(w) => f.write_str(w),
        }
    }
}

/// Lower-cases each word and upper-cases its first letter (`"mON"` → `"Mon"`).
fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() || c == '_' {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Months a rule applies to.
///
/// Tokens that are not month numbers are kept, so validation can report them
/// and exports write them back, but they never match a date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Months {
    values: Vec<u32>,
    unparsed: Vec<String>,
}

impl Months {
    pub fn contains(&self, month: &u32) -> bool {
        self.values.contains(month)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u32> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    /// Tokens that did not parse as a month number.
    pub fn unparsed(&self) -> &[String] {
        &self.unparsed
    }

    /// `true` when the document listed no months at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.unparsed.is_empty()
    }

    fn push_token(&mut self, raw: &str) {
        match raw.trim().parse::<u32>() {
            Ok(m) => self.values.push(m),
            Err(_) => self.unparsed.push(raw.trim().to_string()),
        }
    }
}

impl From<Vec<u32>> for Months {
    fn from(values: Vec<u32>) -> Self {
        Self {
            values,
            unparsed: Vec::new(),
        }
    }
}

impl PartialEq<Vec<u32>> for Months {
    fn eq(&self, other: &Vec<u32>) -> bool {
        self.unparsed.is_empty() && self.values == *other
    }
}

impl Serialize for Months {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tokens: Vec<RawToken> = self
            .values
            .iter()
            .map(|m| RawToken::Number(*m))
            .chain(self.unparsed.iter().cloned().map(RawToken::Text))
            .collect();
        tokens.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Months {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut months = Months::default();
        match ListForm::<RawToken>::deserialize(deserializer)? {
            ListForm::Items(v) => {
                for token in v {
                    match token {
                        RawToken::Number(m) => months.values.push(m),
                        RawToken::Text(s) => months.push_token(&s),
                    }
                }
            }
            ListForm::Csv(s) => csv_tokens(&s).for_each(|t| months.push_token(t)),
        }
        Ok(months)
    }
}

/// Declarative mapping from months plus weekdays or dates to a drive cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Months (1–12) the rule applies to.
    pub months: Months,
    pub filter_type: FilterType,
    /// Weekday names for `weekday` rules, days of month for `date` rules.
    #[serde(deserialize_with = "day_token_list")]
    pub days_or_dates: Vec<DayToken>,
    #[serde(deserialize_with = "trimmed_string")]
    pub drive_cycle_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarRule {
    /// A rule selecting `drive_cycle_id` on the given weekdays of `months`.
    pub fn weekdays(months: &[u32], days: &[&str], drive_cycle_id: impl Into<String>) -> Self {
        Self {
            months: Months::from(months.to_vec()),
            filter_type: FilterType::Weekday,
            days_or_dates: days.iter().map(|d| DayToken::parse(d)).collect(),
            drive_cycle_id: drive_cycle_id.into(),
            ..Self::default()
        }
    }

    /// A rule selecting `drive_cycle_id` on the given days of month of `months`.
    pub fn dates(months: &[u32], dates: &[u32], drive_cycle_id: impl Into<String>) -> Self {
        Self {
            months: Months::from(months.to_vec()),
            filter_type: FilterType::Date,
            days_or_dates: dates.iter().copied().map(DayToken::Date).collect(),
            drive_cycle_id: drive_cycle_id.into(),
            ..Self::default()
        }
    }

    /// Weekday names this rule lists (ignoring dates).
    pub fn weekday_tokens(&self) -> impl Iterator<Item = &str> {
        self.days_or_dates.iter().filter_map(|t| match t {
            DayToken::Weekday(w) => Some(w.as_str()),
            DayToken::Date(_) => None,
        })
    }

    /// Days of month this rule lists (ignoring weekday names).
    pub fn date_tokens(&self) -> impl Iterator<Item = u32> + '_ {
        self.days_or_dates.iter().filter_map(|t| match t {
            DayToken::Date(n) => Some(*n),
            DayToken::Weekday(_) => None,
        })
    }
}

// Both list fields accept either a JSON array or the comma-separated string
// written by the import path.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListForm<T> {
    Items(Vec<T>),
    Csv(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawToken {
    Number(u32),
    Text(String),
}

fn csv_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn day_token_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DayToken>, D::Error> {
    Ok(match ListForm::<RawToken>::deserialize(deserializer)? {
        ListForm::Items(v) => v
            .into_iter()
            .map(|t| match t {
                RawToken::Number(n) => DayToken::Date(n),
                RawToken::Text(s) => DayToken::parse(&s),
            })
            .collect(),
        ListForm::Csv(s) => csv_tokens(&s).map(DayToken::parse).collect(),
    })
}

fn trimmed_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}
