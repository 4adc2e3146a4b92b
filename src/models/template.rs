use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recurring definition a task is generated from. The planner borrows these,
/// never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub task_name: String,
    pub description: Option<String>,
    /// 1 (lowest) .. 5 (highest).
    pub priority: u8,
    pub is_active: bool,
    pub is_mandatory: bool,
    pub duration_minutes: u32,
    /// Crunch-time floor; must be `<= duration_minutes`.
    pub min_duration_minutes: u32,
    pub scheduling_type: SchedulingType,
    /// Required when `scheduling_type == Fixed`.
    pub default_time: Option<String>,
    /// Required when `scheduling_type == Flexible`.
    pub time_window: Option<TimeWindowName>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub recurrence_rule: Option<RecurrenceRule>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingType {
    Fixed,
    Flexible,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindowName {
    Morning,
    Afternoon,
    Evening,
    Anytime,
}

impl TimeWindowName {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindowName::Morning => "morning",
            TimeWindowName::Afternoon => "afternoon",
            TimeWindowName::Evening => "evening",
            TimeWindowName::Anytime => "anytime",
        }
    }
}

/// Closed tagged variant replacing the source's RRULE-string dispatch:
/// exhaustive matching eliminates the "unknown frequency" branch at compile
/// time. Common recurrence fields live on `RecurrenceRule`; frequency-only
/// fields live on `Frequency`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub end_after_occurrences: Option<u32>,
}

impl RecurrenceRule {
    pub fn none() -> Self {
        RecurrenceRule {
            frequency: Frequency::None,
            interval: 1,
            start_date: None,
            end_date: None,
            end_after_occurrences: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    None,
    Daily,
    Weekly { days_of_week: Vec<u32> },
    Monthly { day_of_month: i32 },
    Yearly { month: u32, day_of_month: i32 },
    Custom { pattern: CustomPattern },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomPattern {
    Weekdays,
    Weekends,
    NthWeekday { nth_week: u32, day_of_week: u32 },
    LastWeekday { day_of_week: u32 },
    BusinessDays,
}
