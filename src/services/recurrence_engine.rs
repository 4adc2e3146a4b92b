//! Decides whether a template should produce an instance on a given date,
//! and enumerates occurrences over a range. Pure: every suspension point
//! (reading occurrence history for `endAfterOccurrences`) is resolved by
//! the caller before entering this module — see `Store::count_occurrences`.

use chrono::{Datelike, NaiveDate};

use crate::error::PlannerWarning;
use crate::models::template::{CustomPattern, Frequency, RecurrenceRule, Template};
use crate::services::time::{day_of_week, days_between, last_day_of_month, months_between, weeks_between, years_between};

/// `Some(n)` is the caller-supplied result of `Store::count_occurrences` up
/// to (but excluding) the date being evaluated; `None` means no store was
/// supplied, which this implementation treats as "unbounded" per the
/// design notes' open question.
pub type OccurrenceCount = Option<u32>;

pub fn should_fire_on(
    template: &Template,
    date: NaiveDate,
    occurrences_before: OccurrenceCount,
) -> bool {
    let rule = match &template.recurrence_rule {
        None => return true,
        Some(rule) => rule,
    };
    if matches!(rule.frequency, Frequency::None) {
        return true;
    }

    if let Some(start) = rule.start_date {
        if date < start {
            return false;
        }
    }
    if let Some(end) = rule.end_date {
        if date > end {
            return false;
        }
    }
    if let Some(limit) = rule.end_after_occurrences {
        if let Some(count) = occurrences_before {
            if count >= limit {
                return false;
            }
        }
    }

    let start = rule.start_date.unwrap_or(date);
    matches_frequency(rule, &rule.frequency, start, date)
}

fn matches_frequency(rule: &RecurrenceRule, frequency: &Frequency, start: NaiveDate, date: NaiveDate) -> bool {
    match frequency {
        Frequency::None => true,
        Frequency::Daily => days_between(start, date).rem_euclid(rule.interval as i64) == 0,
        Frequency::Weekly { days_of_week } => {
            if days_of_week.is_empty() {
                return false;
            }
            days_of_week.contains(&day_of_week(date))
                && weeks_between(start, date).rem_euclid(rule.interval as i64) == 0
        }
        Frequency::Monthly { day_of_month } => {
            let day_matches = if *day_of_month == -1 {
                date.day() == last_day_of_month(date.year(), date.month())
            } else {
                date.day() as i32 == *day_of_month
            };
            day_matches && months_between(start, date).rem_euclid(rule.interval as i64) == 0
        }
        Frequency::Yearly { month, day_of_month } => {
            date.month() == *month
                && date.day() as i32 == *day_of_month
                && years_between(start, date).rem_euclid(rule.interval as i64) == 0
        }
        Frequency::Custom { pattern } => matches_custom(pattern, date),
    }
}

fn matches_custom(pattern: &CustomPattern, date: NaiveDate) -> bool {
    let dow = day_of_week(date);
    match pattern {
        CustomPattern::Weekdays | CustomPattern::BusinessDays => (1..=5).contains(&dow),
        CustomPattern::Weekends => dow == 0 || dow == 6,
        CustomPattern::NthWeekday {
            nth_week,
            day_of_week: target,
        } => {
            let nth = (date.day() as u32 + 6) / 7; // ceil(day / 7)
            dow == *target && nth == *nth_week
        }
        CustomPattern::LastWeekday { day_of_week: target } => {
            dow == *target && (date + chrono::Duration::days(7)).month() != date.month()
        }
    }
}

/// Forward day-by-day search up to one year. Returns the first firing date
/// strictly after `from`, or `None`.
pub fn next_occurrence(
    template: &Template,
    from: NaiveDate,
    occurrences_before: OccurrenceCount,
) -> Option<NaiveDate> {
    let mut cursor = from + chrono::Duration::days(1);
    let limit = from + chrono::Duration::days(366);
    while cursor <= limit {
        if should_fire_on(template, cursor, occurrences_before) {
            return Some(cursor);
        }
        cursor += chrono::Duration::days(1);
    }
    None
}

/// Linear scan over `[start, end]` inclusive; result is finite and sorted
/// ascending by construction.
pub fn occurrences_in_range(
    template: &Template,
    start: NaiveDate,
    end: NaiveDate,
    occurrences_before: OccurrenceCount,
) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        if should_fire_on(template, cursor, occurrences_before) {
            out.push(cursor);
        }
        cursor += chrono::Duration::days(1);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub fn validate_rule(rule: &RecurrenceRule) -> RuleValidation {
    let mut errors = Vec::new();

    if rule.interval < 1 {
        errors.push("interval must be >= 1".to_string());
    }
    if let (Some(start), Some(end)) = (rule.start_date, rule.end_date) {
        if start > end {
            errors.push("startDate must be <= endDate".to_string());
        }
    }
    if rule.end_date.is_some() && rule.end_after_occurrences.is_some() {
        errors.push("endDate and endAfterOccurrences are mutually exclusive".to_string());
    }

    match &rule.frequency {
        Frequency::Weekly { days_of_week } => {
            if days_of_week.iter().any(|d| *d > 6) {
                errors.push("daysOfWeek entries must be 0..=6".to_string());
            }
        }
        Frequency::Monthly { day_of_month } => {
            if *day_of_month != -1 && !(1..=31).contains(day_of_month) {
                errors.push("dayOfMonth must be 1..=31 or -1".to_string());
            }
        }
        Frequency::Yearly { month, day_of_month } => {
            if !(1..=12).contains(month) {
                errors.push("month must be 1..=12".to_string());
            }
            if *day_of_month != -1 && !(1..=31).contains(day_of_month) {
                errors.push("dayOfMonth must be 1..=31 or -1".to_string());
            }
        }
        Frequency::Custom {
            pattern: CustomPattern::NthWeekday { nth_week, day_of_week },
        } => {
            if !(1..=5).contains(nth_week) {
                errors.push("nthWeek must be 1..=5".to_string());
            }
            if *day_of_week > 6 {
                errors.push("dayOfWeek must be 0..=6".to_string());
            }
        }
        Frequency::Custom {
            pattern: CustomPattern::LastWeekday { day_of_week },
        } => {
            if *day_of_week > 6 {
                errors.push("dayOfWeek must be 0..=6".to_string());
            }
        }
        _ => {}
    }

    RuleValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Logs the degradation the spec requires when frequency dispatch cannot
/// resolve a variant at evaluation time. The closed enum makes this
/// unreachable for the built-in variants; kept as the documented escape
/// hatch the design notes call out.
pub fn warn_unknown_frequency(template_id: &str) {
    PlannerWarning::UnknownRecurrenceFrequency {
        template_id: template_id.to_string(),
    }
    .log();
}
