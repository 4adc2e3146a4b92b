//! Five-step planner: places anchors, respects dependencies, slots
//! flexible work into time windows, and marks all residual conflicts.
//! Pure function of its inputs; the only suspension point a caller needs
//! to resolve beforehand is `Store::count_occurrences` for
//! `endAfterOccurrences` templates (see `recurrence_engine`).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult, PlannerWarning};
use crate::models::instance::{Instance, InstanceStatus};
use crate::models::schedule::{ConflictRecord, ConflictSeverity, PlanResult, ScheduledTask, SleepSchedule};
use crate::models::template::{SchedulingType, Template};
use crate::services::recurrence_engine::{should_fire_on, OccurrenceCount};
use crate::services::time::{format_hhmm, intervals_overlap, overlap_minutes};

struct PlanNode<'a> {
    template: &'a Template,
    scheduled_time: Option<u32>,
    is_anchor: bool,
    dependency_adjusted: bool,
}

fn canonical_infeasibility_suggestions() -> Vec<String> {
    vec![
        "Reduce your sleep duration".to_string(),
        "Demote one or more mandatory tasks to optional".to_string(),
        "Shorten task durations".to_string(),
        "Postpone less urgent tasks to another day".to_string(),
    ]
}

/// A template is active on `date` iff it fires today and no instance for
/// it on that date is already `completed` or `skipped`.
fn is_active(
    template: &Template,
    date: NaiveDate,
    instances: &[Instance],
    occurrences_before: &dyn Fn(&str) -> OccurrenceCount,
) -> bool {
    if !should_fire_on(template, date, occurrences_before(&template.id)) {
        return false;
    }
    !instances
        .iter()
        .any(|i| i.template_id == template.id && matches!(i.status, InstanceStatus::Completed | InstanceStatus::Skipped))
}

fn is_within_waking_hours(minute: u32, wake_time: u32, sleep_time: u32) -> bool {
    if wake_time <= sleep_time {
        minute >= wake_time && minute < sleep_time
    } else {
        // Sleep window wraps past midnight.
        minute >= wake_time || minute < sleep_time
    }
}

pub fn plan(
    templates: &[Template],
    instances: &[Instance],
    sleep_schedule: SleepSchedule,
    date: NaiveDate,
    config: &PlannerConfig,
    occurrences_before: &dyn Fn(&str) -> OccurrenceCount,
) -> PlannerResult<PlanResult> {
    let active: Vec<&Template> = templates
        .iter()
        .filter(|t| t.is_active && is_active(t, date, instances, occurrences_before))
        .collect::<Vec<&Template>>();

    // Pre-pass: feasibility check over the active mandatory workload.
    // Gating on templates that don't even fire today, or are already
    // done, would reject otherwise-plannable days, so the active filter
    // runs first even though it's narrated second in the step order.
    let mandatory_minutes: u32 = active
        .iter()
        .filter(|t| t.is_mandatory)
        .map(|t| t.duration_minutes)
        .sum();
    let waking_minutes = 1440u32.saturating_sub(sleep_schedule.duration_minutes);

    if mandatory_minutes > waking_minutes {
        let suggestions = canonical_infeasibility_suggestions();
        let message = format!(
            "Mandatory workload ({mandatory_minutes} min) exceeds waking time ({waking_minutes} min)"
        );
        let _ = PlannerError::impossible_schedule(message.clone(), suggestions.clone());
        return Ok(PlanResult {
            success: false,
            schedule: vec![],
            sleep_schedule,
            total_tasks: active.len(),
            scheduled_tasks: 0,
            error: Some("impossible_schedule".to_string()),
            message: Some(message),
            suggestions: Some(suggestions),
        });
    }

    let mut nodes: Vec<PlanNode> = active
        .iter()
        .map(|&template| PlanNode {
            template,
            scheduled_time: None,
            is_anchor: false,
            dependency_adjusted: false,
        })
        .collect();

    // Step 1 — place anchors.
    let mut anchor_indices: Vec<usize> = Vec::new();
    for (i, node) in nodes.iter_mut().enumerate() {
        if node.template.is_mandatory
            && node.template.scheduling_type == SchedulingType::Fixed
            && node.template.default_time.is_some()
        {
            let minute = crate::services::time::parse_hhmm(node.template.default_time.as_ref().unwrap())?;
            node.scheduled_time = Some(minute);
            node.is_anchor = true;
            anchor_indices.push(i);

            if !is_within_waking_hours(minute, sleep_schedule.wake_time, sleep_schedule.sleep_time) {
                PlannerWarning::AnchorOutsideWakingHours {
                    task_id: node.template.id.clone(),
                }
                .log();
            }
        }
    }
    anchor_indices.sort_by_key(|&i| nodes[i].scheduled_time.unwrap());

    // Step 2 — resolve dependencies via Kahn's algorithm with a
    // priority-descending tie-break, distinct from the resolver's own
    // DFS-based topological sort used elsewhere in the module.
    let ids: Vec<&str> = nodes.iter().map(|n| n.template.id.as_str()).collect();
    let index_of: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for dep_id in &node.template.depends_on {
            if let Some(&j) = index_of.get(dep_id.as_str()) {
                dependencies[i].push(j);
                dependents[j].push(i);
            } else {
                PlannerWarning::MissingDependency {
                    task_id: node.template.id.clone(),
                    dependency_id: dep_id.clone(),
                }
                .log();
            }
        }
    }

    let order = kahn_priority_order(&nodes, &dependencies, &dependents);

    // Step 3 — slot flexible tasks in dependency order.
    let buffers = config.buffer_minutes;
    for &i in &order {
        if nodes[i].is_anchor {
            continue;
        }
        slot_task(i, &nodes, &dependencies, config, buffers.slot, buffers.safe_slot)
            .map(|(start, adjusted)| {
                nodes[i].scheduled_time = Some(start);
                nodes[i].dependency_adjusted = adjusted;
            })
            .unwrap_or_else(|| {
                PlannerWarning::NoViableSlot {
                    task_id: nodes[i].template.id.clone(),
                }
                .log();
            });
    }

    // Step 4 — crunch-time. Reserved extension point; no-op by contract.
    crunch_time_noop(&mut nodes);

    // Step 5 — detect and mark conflicts.
    let scheduled_tasks = build_conflict_annotated_schedule(&nodes);

    let scheduled_count = scheduled_tasks.iter().filter(|t| t.scheduled_time.is_some()).count();

    Ok(PlanResult {
        success: true,
        total_tasks: nodes.len(),
        scheduled_tasks: scheduled_count,
        schedule: scheduled_tasks,
        sleep_schedule,
        error: None,
        message: None,
        suggestions: None,
    })
}

fn slot_task(
    i: usize,
    nodes: &[PlanNode],
    dependencies: &[Vec<usize>],
    config: &PlannerConfig,
    slot_buffer: u32,
    safe_slot_buffer: u32,
) -> Option<(u32, bool)> {
    let template = nodes[i].template;
    let window_name = template
        .time_window
        .map(|w| w.as_str().to_string())
        .unwrap_or_else(|| "anytime".to_string());
    let window = config.window(&window_name);

    let dep_ends: Vec<u32> = dependencies[i]
        .iter()
        .filter_map(|&dep| nodes[dep].scheduled_time.map(|start| start + nodes[dep].template.duration_minutes))
        .collect();

    let try_with_buffer = |buffer: u32| -> Option<u32> {
        let earliest_start = dep_ends.iter().max().map(|&end| end + buffer).unwrap_or(window.start);
        let actual_start = window.start.max(earliest_start);
        if actual_start >= window.end {
            return None;
        }
        // Candidates sit on the day's fixed :00/:15/:30/:45 grid, not on an
        // offset from `actual_start` — round up to the next grid line before
        // probing.
        let granularity = config.slot_granularity_minutes.max(1);
        let mut candidate = ((actual_start + granularity - 1) / granularity) * granularity;
        while candidate + template.duration_minutes <= window.end {
            let conflict_free = !nodes.iter().any(|other| {
                if std::ptr::eq(other.template, template) {
                    return false;
                }
                match other.scheduled_time {
                    Some(other_start) => intervals_overlap(
                        candidate,
                        candidate + template.duration_minutes,
                        other_start,
                        other_start + other.template.duration_minutes,
                    ),
                    None => false,
                }
            });
            if conflict_free {
                let respects_deps = dep_ends.iter().all(|&end| candidate >= end);
                if respects_deps {
                    return Some(candidate);
                }
            }
            candidate += granularity;
        }
        None
    };

    let dependency_adjusted = !dep_ends.is_empty();

    if let Some(start) = try_with_buffer(slot_buffer) {
        return Some((start, dependency_adjusted));
    }
    try_with_buffer(safe_slot_buffer).map(|start| (start, dependency_adjusted))
}

/// Seed the queue with in-degree-zero nodes; each iteration sorts the
/// current queue descending by priority before dequeuing, to make the
/// tie-break deterministic. Any remainder after the queue drains holds a
/// cycle and is appended in priority-descending order rather than causing
/// the planner to abort.
fn kahn_priority_order(
    nodes: &[PlanNode],
    dependencies: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> Vec<usize> {
    let n = nodes.len();
    let mut in_degree: Vec<usize> = dependencies.iter().map(|d| d.len()).collect();
    let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut result = Vec::with_capacity(n);
    let mut done = vec![false; n];

    while !queue.is_empty() {
        queue.sort_by(|&a, &b| nodes[b].template.priority.cmp(&nodes[a].template.priority));
        let next = queue.remove(0);
        result.push(next);
        done[next] = true;
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push(dependent);
            }
        }
    }

    if result.len() < n {
        let cycle: Vec<String> = (0..n)
            .filter(|&i| !done[i])
            .map(|i| nodes[i].template.id.clone())
            .collect();
        PlannerWarning::CircularDependency { cycle }.log();

        let mut remaining: Vec<usize> = (0..n).filter(|&i| !done[i]).collect();
        remaining.sort_by(|&a, &b| nodes[b].template.priority.cmp(&nodes[a].template.priority));
        result.extend(remaining);
    }

    result
}

fn crunch_time_noop(_nodes: &mut [PlanNode]) {
    // Reserved for future compression of long flexible tasks down to
    // their minDurationMinutes floor when the day is over-packed.
}

fn build_conflict_annotated_schedule(nodes: &[PlanNode]) -> Vec<ScheduledTask> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_key(|&i| nodes[i].scheduled_time.unwrap_or(u32::MAX));

    let mut tasks: Vec<ScheduledTask> = order
        .iter()
        .map(|&i| {
            let node = &nodes[i];
            ScheduledTask {
                id: node.template.id.clone(),
                task_name: node.template.task_name.clone(),
                scheduled_time: node.scheduled_time.and_then(|m| format_hhmm(m).ok()),
                duration_minutes: node.template.duration_minutes,
                priority: node.template.priority,
                is_mandatory: node.template.is_mandatory,
                is_anchor: node.is_anchor,
                is_flexible: node.template.scheduling_type == SchedulingType::Flexible,
                dependency_adjusted: node.dependency_adjusted,
                has_conflicts: false,
                conflict_type: None,
                conflict_severity: None,
                conflicts: vec![],
            }
        })
        .collect();

    let id_to_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(pos, &i)| (nodes[i].template.id.as_str(), pos))
        .collect();

    for &a in &order {
        let a_pos = id_to_index[nodes[a].template.id.as_str()];
        // No slot survived even the safe-slot fallback: the task never got
        // a `scheduledTime`, so it has nothing to scan for overlaps against,
        // but it must not surface as conflict-free. Reference choice (spec
        // §4.4 Step 3.5): flag it with a `dependency_violation` against
        // itself rather than let it silently vanish from the conflict scan.
        let Some(a_start) = nodes[a].scheduled_time else {
            tasks[a_pos].has_conflicts = true;
            tasks[a_pos].conflict_type = Some("dependency_violation".to_string());
            tasks[a_pos].conflict_severity = Some(ConflictSeverity::High);
            tasks[a_pos].conflicts = vec![ConflictRecord::DependencyViolation {
                conflict_with: nodes[a].template.id.clone(),
                conflict_with_name: nodes[a].template.task_name.clone(),
                issue: "no viable slot found within time window".to_string(),
                task_start: 0,
                dependency_end: 0,
                violation_minutes: 0,
            }];
            continue;
        };
        let a_end = a_start + nodes[a].template.duration_minutes;
        let mut conflicts = Vec::new();

        for &b in &order {
            if a == b {
                continue;
            }
            let Some(b_start) = nodes[b].scheduled_time else {
                continue;
            };
            let b_end = b_start + nodes[b].template.duration_minutes;
            if intervals_overlap(a_start, a_end, b_start, b_end) {
                conflicts.push(ConflictRecord::TimeOverlap {
                    conflict_with: nodes[b].template.id.clone(),
                    conflict_with_name: nodes[b].template.task_name.clone(),
                    overlap_start: a_start.max(b_start),
                    overlap_end: a_end.min(b_end),
                    overlap_minutes: overlap_minutes(a_start, a_end, b_start, b_end),
                });
            }
        }

        for dep_id in &nodes[a].template.depends_on {
            match id_to_index.get(dep_id.as_str()) {
                Some(&b_pos) => {
                    let b = order[b_pos];
                    match nodes[b].scheduled_time {
                        Some(b_start) => {
                            let b_end = b_start + nodes[b].template.duration_minutes;
                            if a_start < b_end {
                                conflicts.push(ConflictRecord::DependencyViolation {
                                    conflict_with: nodes[b].template.id.clone(),
                                    conflict_with_name: nodes[b].template.task_name.clone(),
                                    issue: "task starts before its dependency ends".to_string(),
                                    task_start: a_start,
                                    dependency_end: b_end,
                                    violation_minutes: b_end - a_start,
                                });
                            }
                        }
                        None => conflicts.push(ConflictRecord::MissingDependency {
                            conflict_with: nodes[b].template.id.clone(),
                            conflict_with_name: nodes[b].template.task_name.clone(),
                            issue: "dependency could not be placed".to_string(),
                        }),
                    }
                }
                None => conflicts.push(ConflictRecord::MissingDependency {
                    conflict_with: dep_id.clone(),
                    conflict_with_name: dep_id.clone(),
                    issue: "dependency not found in active set".to_string(),
                }),
            }
        }

        if !conflicts.is_empty() {
            let has_dependency_issue = conflicts.iter().any(ConflictRecord::is_dependency_issue);
            let severity = if has_dependency_issue {
                ConflictSeverity::High
            } else {
                let max_overlap = conflicts
                    .iter()
                    .filter_map(|c| match c {
                        ConflictRecord::TimeOverlap { overlap_minutes, .. } => Some(*overlap_minutes),
                        _ => None,
                    })
                    .max()
                    .unwrap_or(0);
                if max_overlap >= 60 {
                    ConflictSeverity::High
                } else if max_overlap >= 30 {
                    ConflictSeverity::Medium
                } else {
                    ConflictSeverity::Low
                }
            };
            tasks[a_pos].has_conflicts = true;
            tasks[a_pos].conflict_type = Some(
                if has_dependency_issue {
                    "dependency_violation"
                } else {
                    "time_overlap"
                }
                .to_string(),
            );
            tasks[a_pos].conflict_severity = Some(severity);
            tasks[a_pos].conflicts = conflicts;
        }
    }

    tasks
}

/// Scoring rubric for the smart-suggestion API. Not used by the core
/// slotter — heuristic, tested for monotonicity rather than absolute
/// values per the design notes' open question.
pub fn score_candidate_slot(start_minute: u32, next_task_gap_minutes: Option<u32>) -> i32 {
    let hour = start_minute / 60;
    let mut score: i32 = 100;

    if (9..17).contains(&hour) {
        score += 20;
    } else if (8..19).contains(&hour) {
        score += 10;
    }
    if hour < 7 || hour > 21 {
        score -= 30;
    }

    if let Some(gap) = next_task_gap_minutes {
        if gap > 30 {
            score += 15;
        } else if gap > 15 {
            score += 5;
        }
    }

    if start_minute % 15 == 0 {
        score += 5;
    }

    score
}

pub fn find_optimal_time_slots(
    window: crate::config::MinuteInterval,
    duration_minutes: u32,
    granularity_minutes: u32,
    existing: &[(u32, u32)],
    max_suggestions: usize,
) -> Vec<(u32, i32)> {
    let mut candidates = Vec::new();
    let mut start = window.start;
    while start + duration_minutes <= window.end {
        let end = start + duration_minutes;
        let conflict_free = !existing.iter().any(|&(s, e)| intervals_overlap(start, end, s, e));
        if conflict_free {
            let next_gap = existing
                .iter()
                .filter(|&&(s, _)| s >= end)
                .map(|&(s, _)| s - end)
                .min();
            candidates.push((start, score_candidate_slot(start, next_gap)));
        }
        start += granularity_minutes.max(1);
    }
    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.truncate(max_suggestions);
    candidates
}
