//! Calendar resolution: which drive cycle runs on a given date.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{CalendarRule, DAYS_OF_WEEK, FilterType};

/// Why a day got its drive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DaySource {
    /// Matched the calendar rule at this position.
    Rule { index: usize },
    /// No rule matched; the default drive cycle applies.
    Default,
    /// No rule matched and no default is set.
    Unmatched,
}

impl fmt::Display for DaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule { index } => write!(f, "rule {}", index + 1),
            Self::Default => f.write_str("default"),
            Self::Unmatched => f.write_str("unmatched"),
        }
    }
}

/// Outcome of resolving one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub drive_cycle_id: Option<&'a str>,
    pub source: DaySource,
}

/// Three-letter weekday name of `date` (`"Mon"` … `"Sun"`).
pub fn weekday_name(date: NaiveDate) -> &'static str {
    DAYS_OF_WEEK[date.weekday().num_days_from_monday() as usize]
}

/// Returns `true` if `rule` selects `date`.
pub fn rule_matches(rule: &CalendarRule, date: NaiveDate) -> bool {
    if !rule.months.contains(&date.month()) {
        return false;
    }
    match rule.filter_type {
        FilterType::Weekday => {
            let name = weekday_name(date);
            rule.weekday_tokens().any(|w| w == name)
        }
        FilterType::Date => rule.date_tokens().any(|d| d == date.day()),
    }
}

/// Resolves `date` against `rules` in order, then `default_id`.
///
/// The first matching rule wins; overlapping rules are never an error.
pub fn resolve<'a>(
    date: NaiveDate,
    rules: &'a [CalendarRule],
    default_id: Option<&'a str>,
) -> Resolution<'a> {
    if let Some((index, rule)) = rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule_matches(rule, date))
    {
        return Resolution {
            drive_cycle_id: Some(rule.drive_cycle_id.as_str()),
            source: DaySource::Rule { index },
        };
    }
    match default_id {
        Some(id) => Resolution {
            drive_cycle_id: Some(id),
            source: DaySource::Default,
        },
        None => Resolution {
            drive_cycle_id: None,
            source: DaySource::Unmatched,
        },
    }
}

/// Two rules that can both match some calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOverlap {
    /// Position of the earlier rule, which takes precedence.
    pub first: usize,
    pub second: usize,
    /// Months in which both rules can fire.
    pub months: Vec<u32>,
}

impl fmt::Display for RuleOverlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let months: Vec<String> = self.months.iter().map(ToString::to_string).collect();
        write!(
            f,
            "rule {} overlaps rule {} in month(s) {}; rule {} wins",
            self.second + 1,
            self.first + 1,
            months.join(","),
            self.first + 1
        )
    }
}

/// Longest possible length of `month` in any year.
fn max_days_in_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn has_date_in(rule: &CalendarRule, month: u32) -> bool {
    rule.date_tokens()
        .any(|d| (1..=max_days_in_month(month)).contains(&d))
}

fn has_known_weekday(rule: &CalendarRule) -> bool {
    rule.weekday_tokens().any(|w| DAYS_OF_WEEK.contains(&w))
}

fn overlap_in_month(a: &CalendarRule, b: &CalendarRule, month: u32) -> bool {
    match (a.filter_type, b.filter_type) {
        (FilterType::Weekday, FilterType::Weekday) => a
            .weekday_tokens()
            .any(|w| DAYS_OF_WEEK.contains(&w) && b.weekday_tokens().any(|x| x == w)),
        (FilterType::Date, FilterType::Date) => a.date_tokens().any(|d| {
            (1..=max_days_in_month(month)).contains(&d) && b.date_tokens().any(|x| x == d)
        }),
        (FilterType::Weekday, FilterType::Date) => has_known_weekday(a) && has_date_in(b, month),
        (FilterType::Date, FilterType::Weekday) => has_date_in(a, month) && has_known_weekday(b),
    }
}

/// Lists every pair of rules that can match the same day.
///
/// Pure analysis for validation tooling; [`resolve`] never consults it.
/// A weekday rule and a date rule sharing a month are reported whenever
/// the date exists in that month, since some year puts any weekday on it.
pub fn find_overlaps(rules: &[CalendarRule]) -> Vec<RuleOverlap> {
    let mut overlaps = Vec::new();
    for (i, a) in rules.iter().enumerate() {
        for (j, b) in rules.iter().enumerate().skip(i + 1) {
            let mut months: Vec<u32> = a
                .months
                .iter()
                .copied()
                .filter(|m| (1..=12).contains(m) && b.months.contains(m))
                .filter(|&m| overlap_in_month(a, b, m))
                .collect();
            months.sort_unstable();
            months.dedup();
            if !months.is_empty() {
                overlaps.push(RuleOverlap {
                    first: i,
                    second: j,
                    months,
                });
            }
        }
    }
    overlaps
}
