use thiserror::Error;
use tracing::warn;

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Step name carried by `SchedulingError`, matching the five-step pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Anchors,
    Deps,
    Slot,
    Conflicts,
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStep::Anchors => "anchors",
            PipelineStep::Deps => "deps",
            PipelineStep::Slot => "slot",
            PipelineStep::Conflicts => "conflicts",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("impossible schedule: {message}")]
    ImpossibleSchedule {
        message: String,
        suggestions: Vec<String>,
    },

    #[error("planning cancelled")]
    Cancelled,

    #[error("scheduling error at step '{step}': {message}")]
    SchedulingError {
        step: PipelineStep,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlannerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "planner::validation", %message, "invalid input");
        PlannerError::InvalidInput { message }
    }

    pub fn impossible_schedule(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        let message = message.into();
        warn!(target: "planner::feasibility", %message, suggestion_count = suggestions.len(), "impossible schedule");
        PlannerError::ImpossibleSchedule {
            message,
            suggestions,
        }
    }

    pub fn cancelled() -> Self {
        warn!(target: "planner::cancel", "planning cancelled");
        PlannerError::Cancelled
    }

    pub fn scheduling(step: PipelineStep, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "planner::internal", %step, %message, "scheduling invariant violation");
        PlannerError::SchedulingError {
            step,
            message,
            source: None,
        }
    }
}

/// Non-fatal degradation reported alongside a successful plan, per the
/// "errors as values, warnings embedded in output" contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerWarning {
    MissingDependency {
        task_id: String,
        dependency_id: String,
    },
    CircularDependency {
        cycle: Vec<String>,
    },
    DependencyBlocked {
        task_id: String,
        dependency_id: String,
        reason: String,
    },
    NoViableSlot {
        task_id: String,
    },
    AnchorOutsideWakingHours {
        task_id: String,
    },
    UnknownRecurrenceFrequency {
        template_id: String,
    },
}

impl PlannerWarning {
    pub fn log(&self) {
        match self {
            PlannerWarning::MissingDependency {
                task_id,
                dependency_id,
            } => warn!(target: "planner::deps", %task_id, %dependency_id, "dependency not found in active set"),
            PlannerWarning::CircularDependency { cycle } => {
                warn!(target: "planner::deps", cycle = ?cycle, "circular dependency, falling back to priority order")
            }
            PlannerWarning::DependencyBlocked {
                task_id,
                dependency_id,
                reason,
            } => warn!(target: "planner::deps", %task_id, %dependency_id, %reason, "dependency blocks task"),
            PlannerWarning::NoViableSlot { task_id } => {
                warn!(target: "planner::slot", %task_id, "no conflict-free slot found")
            }
            PlannerWarning::AnchorOutsideWakingHours { task_id } => {
                warn!(target: "planner::feasibility", %task_id, "fixed anchor falls outside waking interval")
            }
            PlannerWarning::UnknownRecurrenceFrequency { template_id } => {
                warn!(target: "planner::recurrence", %template_id, "unrecognized recurrence frequency, degraded to non-firing")
            }
        }
    }
}
