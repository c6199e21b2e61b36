//! Human date input and relative date formatting.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{Error, Result};

/// Parse a day typed by a user, relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w", "3d ago"
/// - weekday names ("fri", "friday", "next monday"), meaning the next such day
///   on or after today ("next" skips a week)
/// - "eow" / "end of week" (Sunday of the ISO week)
/// - "YYYY-MM-DD"
pub fn parse_day_input(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = input.trim().to_lowercase();
    let invalid = || Error::InvalidDate(input.trim().to_string());

    let shifted = |days: i64| shift(today, days).ok_or_else(invalid);

    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return shifted(1),
        "yesterday" => return shifted(-1),
        "eow" | "end of week" => {
            return shifted(6 - today.weekday().num_days_from_monday() as i64);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        return parse_span(rest).map_or_else(|| Err(invalid()), shifted);
    }
    if let Some(rest) = s.strip_suffix(" ago") {
        return parse_span(rest)
            .and_then(i64::checked_neg)
            .map_or_else(|| Err(invalid()), shifted);
    }

    let (skip_week, name) = match s.strip_prefix("next ") {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix("this ").unwrap_or(&s)),
    };
    if let Ok(weekday) = name.parse::<Weekday>() {
        let ahead = (weekday.num_days_from_monday() as i64 + 7
            - today.weekday().num_days_from_monday() as i64)
            % 7;
        return shifted(if skip_week { ahead + 7 } else { ahead });
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| invalid())
}

/// `today` moved by `days`, or `None` past either end of the calendar.
fn shift(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    today.checked_add_signed(Duration::try_days(days)?)
}

// Span in days, e.g. "3d" or "2 weeks".
fn parse_span(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (count, unit) = raw.split_at(raw.find(|c: char| !c.is_ascii_digit())?);
    let count: i64 = count.parse().ok()?;
    match unit.trim() {
        "d" | "day" | "days" => Some(count),
        "w" | "week" | "weeks" => count.checked_mul(7),
        _ => None,
    }
}

/// Format a day relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(d) = due else {
        return "-".into();
    };
    match (d - today).num_days() {
        0 => "today".into(),
        1 => "tomorrow".into(),
        n if n > 1 => format!("in {n}d"),
        n => format!("{}d late", -n),
    }
}

/// Format an optional day as `YYYY-MM-DD`, or "-".
pub fn format_day(day: Option<NaiveDate>) -> String {
    day.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Short axis label, e.g. "03-14".
pub fn short_day(day: NaiveDate) -> String {
    day.format("%m-%d").to_string()
}
