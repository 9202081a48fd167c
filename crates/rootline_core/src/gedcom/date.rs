//! GEDCOM date normalization.
//!
//! # Responsibility
//! - Turn raw `DATE` line values into an exact date, a display year
//!   and a precision tag.
//!
//! # Invariants
//! - The year is populated whenever it can be extracted, even when no
//!   exact date exists; persisted rows track year and date separately.
//! - Unparseable or absent input is a documented fallback, not an
//!   error.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EXACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{3,4})$").expect("valid exact-date regex"));
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3})\s+(\d{3,4})$").expect("valid month-year regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{3,4})$").expect("valid year regex"));
static QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:ABT|EST|CAL|BEF|AFT)\.?\s+(.*)$").expect("valid qualifier regex")
});

/// How much of the calendar date the source value pinned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Day,
    Month,
    Year,
    Unknown,
}

/// Result of normalizing one raw GEDCOM date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDate {
    /// Exact date when the source pinned down at least a month
    /// (month-only values resolve to the first of the month).
    pub date: Option<NaiveDate>,
    /// Display year, populated independently of `date`.
    pub year: Option<i32>,
    pub precision: DatePrecision,
    /// Set when the source carried an `ABT`/`EST`/`CAL`/`BEF`/`AFT`
    /// qualifier.
    pub approximate: bool,
}

impl NormalizedDate {
    fn unknown() -> Self {
        Self {
            date: None,
            year: None,
            precision: DatePrecision::Unknown,
            approximate: false,
        }
    }
}

/// Normalizes a raw GEDCOM date value.
///
/// Recognized forms, in priority order: `1 JAN 1990` (day precision),
/// `JUN 1975` (month precision, first of month), `1950` (year only).
/// A leading `ABT`/`EST`/`CAL`/`BEF`/`AFT` qualifier marks the result
/// approximate and delegates to the unqualified parse. Anything else
/// yields the unknown fallback.
pub fn normalize_date(raw: Option<&str>) -> NormalizedDate {
    let Some(raw) = raw else {
        return NormalizedDate::unknown();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedDate::unknown();
    }

    if let Some(caps) = QUALIFIER_RE.captures(trimmed) {
        let inner = normalize_exact_forms(caps[1].trim());
        if inner.precision == DatePrecision::Unknown {
            return inner;
        }
        return NormalizedDate {
            approximate: true,
            ..inner
        };
    }

    normalize_exact_forms(trimmed)
}

fn normalize_exact_forms(value: &str) -> NormalizedDate {
    if let Some(caps) = EXACT_RE.captures(value) {
        let day: u32 = match caps[1].parse() {
            Ok(day) => day,
            Err(_) => return NormalizedDate::unknown(),
        };
        let Some(month) = month_number(&caps[2]) else {
            return NormalizedDate::unknown();
        };
        let Ok(year) = caps[3].parse::<i32>() else {
            return NormalizedDate::unknown();
        };
        // Calendar-invalid days (e.g. 31 FEB) degrade to year-only:
        // the year is still real information worth keeping.
        return match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => NormalizedDate {
                date: Some(date),
                year: Some(year),
                precision: DatePrecision::Day,
                approximate: false,
            },
            None => NormalizedDate {
                date: None,
                year: Some(year),
                precision: DatePrecision::Year,
                approximate: false,
            },
        };
    }

    if let Some(caps) = MONTH_YEAR_RE.captures(value) {
        if let (Some(month), Ok(year)) = (month_number(&caps[1]), caps[2].parse::<i32>()) {
            return NormalizedDate {
                date: NaiveDate::from_ymd_opt(year, month, 1),
                year: Some(year),
                precision: DatePrecision::Month,
                approximate: false,
            };
        }
        return NormalizedDate::unknown();
    }

    if let Some(caps) = YEAR_RE.captures(value) {
        if let Ok(year) = caps[1].parse::<i32>() {
            return NormalizedDate {
                date: None,
                year: Some(year),
                precision: DatePrecision::Year,
                approximate: false,
            };
        }
    }

    NormalizedDate::unknown()
}

fn month_number(token: &str) -> Option<u32> {
    match token.to_ascii_uppercase().as_str() {
        "JAN" => Some(1),
        "FEB" => Some(2),
        "MAR" => Some(3),
        "APR" => Some(4),
        "MAY" => Some(5),
        "JUN" => Some(6),
        "JUL" => Some(7),
        "AUG" => Some(8),
        "SEP" => Some(9),
        "OCT" => Some(10),
        "NOV" => Some(11),
        "DEC" => Some(12),
        _ => None,
    }
}
