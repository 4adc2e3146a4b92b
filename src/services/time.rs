//! Pure time arithmetic shared by the recurrence engine, dependency resolver
//! and scheduling engine: `HH:MM` <-> minute-of-day, `YYYY-MM-DD` calendar
//! arithmetic, and the half-open overlap predicate.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{PlannerError, PlannerResult};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses `HH:MM` into a minute-of-day value in `[0, 1440)`.
pub fn parse_hhmm(s: &str) -> PlannerResult<u32> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(PlannerError::invalid_input(format!(
            "invalid HH:MM time: {s}"
        )));
    }
    let hours: u32 = s[0..2]
        .parse()
        .map_err(|_| PlannerError::invalid_input(format!("invalid HH:MM time: {s}")))?;
    let minutes: u32 = s[3..5]
        .parse()
        .map_err(|_| PlannerError::invalid_input(format!("invalid HH:MM time: {s}")))?;
    if hours > 23 || minutes > 59 {
        return Err(PlannerError::invalid_input(format!(
            "invalid HH:MM time: {s}"
        )));
    }
    Ok(hours * 60 + minutes)
}

/// Formats a minute-of-day value as `HH:MM`. Rejects negative-equivalent or
/// out-of-range (>= 1440) values rather than wrapping or clamping.
pub fn format_hhmm(minutes: u32) -> PlannerResult<String> {
    if minutes >= MINUTES_PER_DAY {
        return Err(PlannerError::invalid_input(format!(
            "minute-of-day out of range: {minutes}"
        )));
    }
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

pub fn parse_date(s: &str) -> PlannerResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| PlannerError::invalid_input(format!("invalid date: {s}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

pub fn weeks_between(a: NaiveDate, b: NaiveDate) -> i64 {
    // Week offset counted from the Sunday that starts `a`'s week, matching
    // the `dayOfWeek` convention (0 = Sunday) used across the recurrence
    // engine.
    let a_week_start = a - Duration::days(day_of_week(a) as i64);
    let b_week_start = b - Duration::days(day_of_week(b) as i64);
    days_between(a_week_start, b_week_start) / 7
}

pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b.year() as i64 - a.year() as i64) * 12 + (b.month() as i64 - a.month() as i64)
}

pub fn years_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.year() as i64 - a.year() as i64
}

pub fn is_leap(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("valid year/month produces a valid first-of-month date");
    (first_of_next - Duration::days(1)).day()
}

/// 0 = Sunday, matching the spec's `daysOfWeek` convention (chrono's
/// `Weekday::num_days_from_sunday` already uses this ordering).
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn weekday_from_index(index: u32) -> Weekday {
    Weekday::try_from(((index + 6) % 7) as u8).expect("index modulo 7 is always in range")
}

/// `[s1,e1) ∩ [s2,e2) ≠ ∅ ⟺ max(s1,s2) < min(e1,e2)`. Adjacent tasks
/// (end-of-A == start-of-B) do NOT overlap.
pub fn intervals_overlap(s1: u32, e1: u32, s2: u32, e2: u32) -> bool {
    s1.max(s2) < e1.min(e2)
}

pub fn overlap_minutes(s1: u32, e1: u32, s2: u32, e2: u32) -> u32 {
    let start = s1.max(s2);
    let end = e1.min(e2);
    end.saturating_sub(start)
}
