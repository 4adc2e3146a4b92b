use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// One reason a task is marked `hasConflicts`, tagged on `type` per the
/// external-interface contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictRecord {
    TimeOverlap {
        conflict_with: String,
        conflict_with_name: String,
        overlap_start: u32,
        overlap_end: u32,
        overlap_minutes: u32,
    },
    DependencyViolation {
        conflict_with: String,
        conflict_with_name: String,
        issue: String,
        task_start: u32,
        dependency_end: u32,
        violation_minutes: u32,
    },
    MissingDependency {
        conflict_with: String,
        conflict_with_name: String,
        issue: String,
    },
}

impl ConflictRecord {
    pub fn is_dependency_issue(&self) -> bool {
        matches!(
            self,
            ConflictRecord::DependencyViolation { .. } | ConflictRecord::MissingDependency { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub task_name: String,
    /// `HH:MM`, `None` when the task could not be placed.
    pub scheduled_time: Option<String>,
    pub duration_minutes: u32,
    pub priority: u8,
    pub is_mandatory: bool,
    pub is_anchor: bool,
    pub is_flexible: bool,
    pub dependency_adjusted: bool,
    pub has_conflicts: bool,
    pub conflict_type: Option<String>,
    pub conflict_severity: Option<ConflictSeverity>,
    pub conflicts: Vec<ConflictRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepSchedule {
    pub wake_time: u32,
    pub sleep_time: u32,
    pub duration_minutes: u32,
}

/// The format returned to callers by the planner's top-level entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub success: bool,
    pub schedule: Vec<ScheduledTask>,
    pub sleep_schedule: SleepSchedule,
    pub total_tasks: usize,
    pub scheduled_tasks: usize,
    pub error: Option<String>,
    pub message: Option<String>,
    pub suggestions: Option<Vec<String>>,
}
