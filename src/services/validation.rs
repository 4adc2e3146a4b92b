//! Template/instance invariants enforced before planning. Mirrors the
//! source's cascading validation checks, collected as data instead of
//! thrown on the first failure.

use crate::models::instance::Instance;
use crate::models::template::{SchedulingType, Template};
use crate::services::dependency_resolver::{build_graph, detect_cycles, NodeInput};
use crate::services::recurrence_engine::validate_rule;
use crate::services::time::parse_date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_template(template: &Template) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if template.task_name.trim().is_empty() {
        errors.push(ValidationError::new("taskName", "task name must not be empty"));
    }
    if template.task_name.chars().count() > 100 {
        errors.push(ValidationError::new("taskName", "task name must be <= 100 characters"));
    }
    if let Some(description) = &template.description {
        if description.chars().count() > 500 {
            errors.push(ValidationError::new("description", "description must be <= 500 characters"));
        }
    }
    if !(1..=720).contains(&template.duration_minutes) {
        errors.push(ValidationError::new("durationMinutes", "duration must be in 1..=720"));
    }
    if template.min_duration_minutes < 1 || template.min_duration_minutes > template.duration_minutes {
        errors.push(ValidationError::new(
            "minDurationMinutes",
            "minDurationMinutes must be >= 1 and <= durationMinutes",
        ));
    }
    if !(1..=5).contains(&template.priority) {
        errors.push(ValidationError::new("priority", "priority must be in 1..=5"));
    }

    match template.scheduling_type {
        SchedulingType::Fixed => match &template.default_time {
            Some(time) => {
                if crate::services::time::parse_hhmm(time).is_err() {
                    errors.push(ValidationError::new("defaultTime", "defaultTime must be a valid HH:MM"));
                }
            }
            None => errors.push(ValidationError::new("defaultTime", "fixed tasks require defaultTime")),
        },
        SchedulingType::Flexible => {
            if template.time_window.is_none() {
                errors.push(ValidationError::new("timeWindow", "flexible tasks require a recognised timeWindow"));
            }
        }
    }

    if template.depends_on.iter().any(|dep| dep == &template.id) {
        errors.push(ValidationError::new("dependsOn", "a template cannot depend on itself"));
    }

    if let Some(rule) = &template.recurrence_rule {
        let outcome = validate_rule(rule);
        for message in outcome.errors {
            errors.push(ValidationError::new("recurrenceRule", message));
        }
    }

    errors
}

/// Self-dependency and existence are checked per-template in
/// `validate_template`; circularity requires the full set, so it is
/// checked separately here using the resolver's cycle scan.
pub fn validate_dependency_graph(templates: &[Template]) -> Vec<ValidationError> {
    let ids: std::collections::HashSet<&str> = templates.iter().map(|t| t.id.as_str()).collect();
    let mut errors = Vec::new();

    for template in templates {
        for dep in &template.depends_on {
            if !ids.contains(dep.as_str()) {
                errors.push(ValidationError::new(
                    "dependsOn",
                    format!("template {} depends on unknown template {}", template.id, dep),
                ));
            }
        }
    }

    let nodes: Vec<NodeInput> = templates
        .iter()
        .map(|t| NodeInput {
            id: t.id.clone(),
            depends_on: t.depends_on.clone(),
        })
        .collect();
    let (graph, _warnings) = build_graph(&nodes);
    let cycles = detect_cycles(&graph);
    for cycle in cycles {
        let ids: Vec<String> = cycle.iter().map(|&i| graph.ids[i].clone()).collect();
        errors.push(ValidationError::new(
            "dependsOn",
            format!("circular dependency: {}", ids.join(" -> ")),
        ));
    }

    errors
}

pub fn validate_instance(instance: &Instance) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if instance.template_id.trim().is_empty() {
        errors.push(ValidationError::new("templateId", "templateId must be present"));
    }
    if parse_date(&instance.date).is_err() {
        errors.push(ValidationError::new("date", "date must be a valid YYYY-MM-DD"));
    }
    // actualDuration is u32, so "actualDuration >= 0" holds unconditionally;
    // there is no representable violation left to check here.
    if instance.status == crate::models::instance::InstanceStatus::Completed {
        match &instance.completed_at {
            Some(completed_at) if !completed_at.trim().is_empty() => {}
            _ => errors.push(ValidationError::new(
                "completedAt",
                "completedAt must be parseable when status is completed",
            )),
        }
    }

    errors
}

/// `endTime` derived-duration invariant from the planner-relevant subset:
/// when a caller supplies an explicit end time alongside `defaultTime`,
/// `endTime` must be strictly later.
pub fn validate_time_range(default_time: &str, end_time: &str) -> Result<u32, ValidationError> {
    let start = crate::services::time::parse_hhmm(default_time)
        .map_err(|_| ValidationError::new("defaultTime", "defaultTime must be a valid HH:MM"))?;
    let end = crate::services::time::parse_hhmm(end_time)
        .map_err(|_| ValidationError::new("endTime", "endTime must be a valid HH:MM"))?;
    if end <= start {
        return Err(ValidationError::new("endTime", "endTime must be after defaultTime"));
    }
    Ok(end - start)
}

pub fn is_valid(errors: &[ValidationError]) -> bool {
    errors.is_empty()
}
