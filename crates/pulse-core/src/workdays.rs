//! Business-day arithmetic.
//!
//! A workday is Monday through Friday; there is no holiday calendar. Every
//! entry point degrades to `0` instead of failing, so callers must read `0`
//! as "unknown" as well as "zero duration".

use chrono::{Datelike, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, tolerating surrounding whitespace.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Number of weekdays in the inclusive range `[start, due]`; `0` when `start > due`.
pub fn count_workdays(start: NaiveDate, due: NaiveDate) -> u32 {
    if start > due {
        return 0;
    }
    let total = (due - start).num_days() + 1;
    let full_weeks = total / 7;
    let first = i64::from(start.weekday().num_days_from_monday());
    let tail = (0..total % 7).filter(|i| (first + i) % 7 < 5).count() as i64;
    (full_weeks * 5 + tail) as u32
}

/// Workdays between two raw date strings; malformed input counts as `0`.
pub fn workdays(start: &str, due: &str) -> u32 {
    match (parse_date(start), parse_date(due)) {
        (Some(s), Some(d)) => count_workdays(s, d),
        _ => 0,
    }
}
