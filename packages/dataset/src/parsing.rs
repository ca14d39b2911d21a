//! Per-cell parsing for incident rows.
//!
//! Nothing here fails: a cell that cannot be parsed becomes `None` and the
//! row is kept.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Parses an occurrence date, trying each format in order.
///
/// Formats that include a time component are accepted and the time is
/// discarded.
#[must_use]
pub fn parse_occurrence_date(s: &str, formats: &[String]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(s, format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Parses an occurrence time of day.
///
/// Second `60` is rejected: chrono reads it as a leap second, which a wall
/// clock time of day never has.
#[must_use]
pub fn parse_occurrence_time(s: &str, format: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(s, format)
        .ok()
        .filter(|t| t.nanosecond() < 1_000_000_000)
}

/// Trims a categorical cell, mapping empty cells to `None`.
#[must_use]
pub fn parse_categorical(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
