//! Free-text date normalization
//!
//! Agents pass dates the way users type them ("12th October 2025",
//! "October 12, 2025", "10/12/2025"). The search API only accepts
//! `YYYY-MM-DD`, so every date goes through [`normalize_date`] first.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

/// Formats tried in order; the first one that parses wins.
///
/// `%m/%d/%Y` sits before `%d/%m/%Y`, so a slash date whose day and month
/// are both 12 or less is always read month-first.
pub const ACCEPTED_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

/// Canonical output format
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)(st|nd|rd|th)").expect("ordinal pattern is valid"));

// `%Y` in chrono takes any digit count, so "25" would parse as year 25
static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("year pattern is valid"));

/// A date string matched none of the [`ACCEPTED_FORMATS`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised date '{input}'")]
pub struct DateParseError {
    pub input: String,
}

/// Normalize an optional free-text date.
///
/// `Ok(None)` means no date was given (absent, empty or blank), which callers
/// treat differently from a date that was given but could not be read.
pub fn normalize_date(input: Option<&str>) -> Result<Option<NaiveDate>, DateParseError> {
    let Some(raw) = input.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };

    let cleaned = strip_ordinals(raw);
    let parsed = if FOUR_DIGIT_YEAR.is_match(&cleaned) {
        ACCEPTED_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            .filter(|date| (1000..=9999).contains(&date.year()))
    } else {
        None
    };

    parsed.map(Some).ok_or_else(|| DateParseError {
        input: raw.to_string(),
    })
}

/// Same as [`normalize_date`], rendered in canonical `YYYY-MM-DD` form
pub fn normalize_date_canonical(input: Option<&str>) -> Result<Option<String>, DateParseError> {
    Ok(normalize_date(input)?.map(format_canonical))
}

#[must_use]
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

fn strip_ordinals(raw: &str) -> String {
    ORDINAL_SUFFIX.replace_all(raw, "$1").trim().to_string()
}
