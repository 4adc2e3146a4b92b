//! The `Event` port: domain intents the UI layer (out of scope) emits and
//! later translates into `Store` writes. Grounded on the teacher's
//! `emit_event` helper — emit, warn on failure, never let emission failure
//! propagate into the planning result.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskId {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPostpone {
    pub task_id: String,
    pub delta_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRename {
    pub task_id: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDrop {
    pub task_id: String,
    pub new_hour: u32,
    pub new_time: String,
}

/// One method per canonical event in the external-interfaces table.
/// Implementations are expected to forward to a UI transport and should
/// never propagate a delivery failure back into the planner; failures are
/// logged, matching the teacher's `emit_event`.
pub trait EventEmitter: Send + Sync {
    fn task_complete(&self, payload: TaskId);
    fn task_edit(&self, payload: TaskId);
    fn task_skip(&self, payload: TaskId);
    fn task_postpone(&self, payload: TaskPostpone);
    fn task_delete(&self, payload: TaskId);
    fn task_rename(&self, payload: TaskRename);
    fn task_drop(&self, payload: TaskDrop);
    fn task_drag_start(&self, payload: TaskId);
}

/// An emitter that only logs — useful for tests and for callers that have
/// not wired a UI transport yet.
pub struct NullEventEmitter;

impl EventEmitter for NullEventEmitter {
    fn task_complete(&self, payload: TaskId) {
        warn!(target: "planner::events", task_id = %payload.task_id, "no transport wired for task-complete");
    }
    fn task_edit(&self, payload: TaskId) {
        warn!(target: "planner::events", task_id = %payload.task_id, "no transport wired for task-edit");
    }
    fn task_skip(&self, payload: TaskId) {
        warn!(target: "planner::events", task_id = %payload.task_id, "no transport wired for task-skip");
    }
    fn task_postpone(&self, payload: TaskPostpone) {
        warn!(target: "planner::events", task_id = %payload.task_id, delta = payload.delta_minutes, "no transport wired for task-postpone");
    }
    fn task_delete(&self, payload: TaskId) {
        warn!(target: "planner::events", task_id = %payload.task_id, "no transport wired for task-delete");
    }
    fn task_rename(&self, payload: TaskRename) {
        warn!(target: "planner::events", task_id = %payload.task_id, new_name = %payload.new_name, "no transport wired for task-rename");
    }
    fn task_drop(&self, payload: TaskDrop) {
        warn!(target: "planner::events", task_id = %payload.task_id, new_hour = payload.new_hour, "no transport wired for task-drop");
    }
    fn task_drag_start(&self, payload: TaskId) {
        warn!(target: "planner::events", task_id = %payload.task_id, "no transport wired for task-drag-start");
    }
}
