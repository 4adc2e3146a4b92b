use serde::{Deserialize, Serialize};

/// Per-date materialization of a template. Created by the generator when
/// the recurrence engine decides a template fires; mutated afterward by
/// user actions (complete/skip/postpone/rename) out of the planner's view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub template_id: String,
    pub date: String,
    pub task_name: String,
    pub duration_minutes: u32,
    pub priority: u8,
    pub status: InstanceStatus,
    /// `HH:MM`, nullable for a pure flexible task that hasn't been placed.
    pub scheduled_time: Option<String>,
    pub actual_duration: Option<u32>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Pending,
    Completed,
    Skipped,
    Postponed,
    Incomplete,
}
