//! Materializes a `Template` into a per-date `Instance` once the recurrence
//! engine decides it fires. Grounded on the teacher's `InstanceGenerator`
//! (`services/instance_generator.rs`), which mints `TaskInstance::id` with
//! `uuid::Uuid::new_v4().to_string()`; the closed `RecurrenceRule` enum here
//! replaces the teacher's RRULE-string walk, but the minting technique and
//! the "pending, snapshot the template, no scheduled time yet" shape carry
//! over unchanged.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::instance::{Instance, InstanceStatus};
use crate::models::template::Template;
use crate::services::recurrence_engine::{occurrences_in_range, should_fire_on, OccurrenceCount};
use crate::services::time::format_date;

/// Builds the pending instance for `template` on `date`, unconditionally.
/// Callers that need the firing check should go through
/// [`generate_due_instance`] or [`generate_instances_in_range`] instead.
pub fn generate_instance(template: &Template, date: NaiveDate) -> Instance {
    Instance {
        id: Uuid::new_v4().to_string(),
        template_id: template.id.clone(),
        date: format_date(date),
        task_name: template.task_name.clone(),
        duration_minutes: template.duration_minutes,
        priority: template.priority,
        status: InstanceStatus::Pending,
        scheduled_time: template.default_time.clone(),
        actual_duration: None,
        completed_at: None,
    }
}

/// `None` when the template is inactive or does not fire on `date`.
pub fn generate_due_instance(
    template: &Template,
    date: NaiveDate,
    occurrences_before: OccurrenceCount,
) -> Option<Instance> {
    if !template.is_active || !should_fire_on(template, date, occurrences_before) {
        return None;
    }
    Some(generate_instance(template, date))
}

/// One instance per firing date in `[start, end]`, ascending — mirrors
/// `recurrence_engine::occurrences_in_range`'s ordering guarantee.
pub fn generate_instances_in_range(
    template: &Template,
    start: NaiveDate,
    end: NaiveDate,
    occurrences_before: OccurrenceCount,
) -> Vec<Instance> {
    if !template.is_active {
        return Vec::new();
    }
    occurrences_in_range(template, start, end, occurrences_before)
        .into_iter()
        .map(|date| generate_instance(template, date))
        .collect()
}
