//! Validates a dependency graph over templates/instances, detects cycles,
//! and produces a topological order. The graph is an arena of nodes
//! addressed by dense `usize` indices — not a `HashMap<String, Node>` with
//! string back-pointers — so cycle/topo algorithms operate on index
//! arithmetic rather than repeated id lookups.

use std::collections::HashMap;

use crate::error::PlannerWarning;
use crate::models::instance::InstanceStatus;

/// One graph node's identity and raw (unfiltered) dependency ids, as
/// supplied by the caller.
#[derive(Debug, Clone)]
pub struct NodeInput {
    pub id: String,
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    pub ids: Vec<String>,
    index_of: HashMap<String, usize>,
    pub dependencies: Vec<Vec<usize>>,
    pub dependents: Vec<Vec<usize>>,
    pub missing_dependencies: Vec<(usize, String)>,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }
}

/// One node per instance keyed by `id`. `dependencies` is `dependsOn`
/// filtered to ids present in the input set; ids that aren't present are
/// reported as warnings, not errors.
pub fn build_graph(nodes: &[NodeInput]) -> (Graph, Vec<PlannerWarning>) {
    let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let index_of: HashMap<String, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect();

    let mut dependencies = vec![Vec::new(); nodes.len()];
    let mut dependents = vec![Vec::new(); nodes.len()];
    let mut missing_dependencies = Vec::new();
    let mut warnings = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        for dep_id in &node.depends_on {
            match index_of.get(dep_id) {
                Some(&j) => {
                    dependencies[i].push(j);
                    dependents[j].push(i);
                }
                None => {
                    missing_dependencies.push((i, dep_id.clone()));
                    let warning = PlannerWarning::MissingDependency {
                        task_id: node.id.clone(),
                        dependency_id: dep_id.clone(),
                    };
                    warning.log();
                    warnings.push(warning);
                }
            }
        }
    }

    (
        Graph {
            ids,
            index_of,
            dependencies,
            dependents,
            missing_dependencies,
        },
        warnings,
    )
}

/// DFS with an explicit recursion stack. When a node re-enters the
/// recursion stack, the current path is sliced from that node's first
/// occurrence and emitted as a cycle (closed: the start index repeated at
/// both ends). Returns every elementary cycle encountered. O(V + E).
pub fn detect_cycles(graph: &Graph) -> Vec<Vec<usize>> {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut cycles = Vec::new();

    for start in 0..n {
        if !visited[start] {
            let mut rec_stack = vec![false; n];
            let mut path = Vec::new();
            dfs_cycle(graph, start, &mut visited, &mut rec_stack, &mut path, &mut cycles);
        }
    }
    cycles
}

fn dfs_cycle(
    graph: &Graph,
    node: usize,
    visited: &mut [bool],
    rec_stack: &mut [bool],
    path: &mut Vec<usize>,
    cycles: &mut Vec<Vec<usize>>,
) {
    visited[node] = true;
    rec_stack[node] = true;
    path.push(node);

    for &dep in &graph.dependencies[node] {
        if rec_stack[dep] {
            if let Some(start_pos) = path.iter().position(|&n| n == dep) {
                let mut cycle: Vec<usize> = path[start_pos..].to_vec();
                cycle.push(dep);
                cycles.push(cycle);
            }
        } else if !visited[dep] {
            dfs_cycle(graph, dep, visited, rec_stack, path, cycles);
        }
    }

    path.pop();
    rec_stack[node] = false;
}

/// DFS post-order topological sort: dependencies appear before their
/// dependents in the returned (reversed post-order) index list. On a
/// cycle, the offending node is skipped rather than causing a panic; the
/// caller is expected to have already logged via `detect_cycles`.
pub fn topological_sort(graph: &Graph) -> Vec<usize> {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut in_progress = vec![false; n];
    let mut post_order = Vec::with_capacity(n);

    for start in 0..n {
        if !visited[start] {
            dfs_post_order(graph, start, &mut visited, &mut in_progress, &mut post_order);
        }
    }

    post_order.reverse();
    post_order
}

fn dfs_post_order(
    graph: &Graph,
    node: usize,
    visited: &mut [bool],
    in_progress: &mut [bool],
    post_order: &mut Vec<usize>,
) {
    visited[node] = true;
    in_progress[node] = true;

    for &dep in &graph.dependencies[node] {
        if in_progress[dep] {
            continue; // cycle: skip the offending edge, never panic
        }
        if !visited[dep] {
            dfs_post_order(graph, dep, visited, in_progress, post_order);
        }
    }

    in_progress[node] = false;
    post_order.push(node);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyConflictReason {
    DependencySkipped { dependency_id: String },
    MandatoryWithIncompleteDependency { dependency_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub node: usize,
    pub suggested_start: u32,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintResult {
    pub resolved: Vec<usize>,
    pub conflicts: Vec<(usize, DependencyConflictReason)>,
    pub updates: Vec<ScheduleUpdate>,
}

/// A node's planning-relevant state, as known going into the constraint
/// pass — status, mandatory-ness, and its current placement if any.
#[derive(Debug, Clone)]
pub struct ConstraintNode {
    pub status: InstanceStatus,
    pub is_mandatory: bool,
    pub scheduled_time: Option<u32>,
    pub duration_minutes: u32,
}

/// For each node in `order`, inspect its dependencies' status and
/// `scheduledTime + durationMinutes`. `buffer_minutes` is the resolver's
/// own 15-minute knob — distinct from the slotter's 5/10-minute buffers.
pub fn apply_constraints(
    order: &[usize],
    graph: &Graph,
    nodes: &[ConstraintNode],
    buffer_minutes: u32,
) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    for &i in order {
        let mut blocked = None;
        for &dep in &graph.dependencies[i] {
            let dep_node = &nodes[dep];
            if dep_node.status == InstanceStatus::Skipped {
                blocked = Some(DependencyConflictReason::DependencySkipped {
                    dependency_id: graph.ids[dep].clone(),
                });
                break;
            }
            if nodes[i].is_mandatory && dep_node.status != InstanceStatus::Completed {
                blocked = Some(DependencyConflictReason::MandatoryWithIncompleteDependency {
                    dependency_id: graph.ids[dep].clone(),
                });
                break;
            }
        }

        if let Some(reason) = blocked {
            let (reason_text, dependency_id) = match &reason {
                DependencyConflictReason::DependencySkipped { dependency_id } => (
                    format!("Dependency {dependency_id} was skipped"),
                    dependency_id.clone(),
                ),
                DependencyConflictReason::MandatoryWithIncompleteDependency { dependency_id } => (
                    format!("Mandatory task blocked by incomplete dependency {dependency_id}"),
                    dependency_id.clone(),
                ),
            };
            PlannerWarning::DependencyBlocked {
                task_id: graph.ids[i].clone(),
                dependency_id,
                reason: reason_text,
            }
            .log();
            result.conflicts.push((i, reason));
            continue;
        }

        result.resolved.push(i);

        let dep_ends: Vec<u32> = graph.dependencies[i]
            .iter()
            .filter_map(|&dep| nodes[dep].scheduled_time.map(|start| start + nodes[dep].duration_minutes))
            .collect();
        if let Some(&max_end) = dep_ends.iter().max() {
            let suggested_start = max_end + buffer_minutes;
            if nodes[i].scheduled_time.map_or(true, |start| start < suggested_start) {
                result.updates.push(ScheduleUpdate {
                    node: i,
                    suggested_start,
                    reason: "Adjusted for dependency constraints",
                });
            }
        }
    }

    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DependencyStats {
    pub total: usize,
    pub with_deps: usize,
    pub avg_deps_per_task: f64,
    pub max_depth: usize,
    pub most_dependent_index: Option<usize>,
    pub density: f64,
}

/// Depth is computed via DFS with a visited-set guard against cycles,
/// removing nodes from `visited` on exit so sibling branches remain
/// eligible to revisit shared ancestors.
pub fn stats(graph: &Graph) -> DependencyStats {
    let total = graph.len();
    if total == 0 {
        return DependencyStats::default();
    }

    let with_deps = graph.dependencies.iter().filter(|d| !d.is_empty()).count();
    let total_edges: usize = graph.dependencies.iter().map(|d| d.len()).sum();
    let avg_deps_per_task = total_edges as f64 / total as f64;

    let mut max_depth = 0;
    let mut most_dependent_index = None;
    let mut most_dependents = 0;

    for i in 0..total {
        let mut visiting = vec![false; total];
        let depth = depth_of(graph, i, &mut visiting);
        if depth > max_depth {
            max_depth = depth;
        }
        if graph.dependents[i].len() > most_dependents {
            most_dependents = graph.dependents[i].len();
            most_dependent_index = Some(i);
        }
    }

    let max_possible_edges = total * total.saturating_sub(1);
    let density = if max_possible_edges == 0 {
        0.0
    } else {
        total_edges as f64 / max_possible_edges as f64
    };

    DependencyStats {
        total,
        with_deps,
        avg_deps_per_task,
        max_depth,
        most_dependent_index,
        density,
    }
}

fn depth_of(graph: &Graph, node: usize, visiting: &mut [bool]) -> usize {
    if visiting[node] {
        return 0; // cycle guard
    }
    visiting[node] = true;
    let depth = graph.dependencies[node]
        .iter()
        .map(|&dep| 1 + depth_of(graph, dep, visiting))
        .max()
        .unwrap_or(0);
    visiting[node] = false;
    depth
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationSuggestion {
    pub node: usize,
    pub suggested_start: u32,
    pub reason: &'static str,
    pub improvement_minutes: u32,
}

/// Recomputes the earliest legal start for each dependent as
/// `max(dep_start + dep_duration) + buffer_minutes` (10 by spec). Emits a
/// suggestion whenever the current start violates that bound.
pub fn optimize_sequencing(
    graph: &Graph,
    nodes: &[ConstraintNode],
    buffer_minutes: u32,
) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();
    for i in 0..graph.len() {
        let dep_ends: Vec<u32> = graph.dependencies[i]
            .iter()
            .filter_map(|&dep| nodes[dep].scheduled_time.map(|start| start + nodes[dep].duration_minutes))
            .collect();
        let Some(&max_end) = dep_ends.iter().max() else {
            continue;
        };
        let earliest = max_end + buffer_minutes;
        if let Some(current) = nodes[i].scheduled_time {
            if current < earliest {
                suggestions.push(OptimizationSuggestion {
                    node: i,
                    suggested_start: earliest,
                    reason: "Earlier dependency completion allows an earlier start",
                    improvement_minutes: earliest - current,
                });
            }
        }
    }
    suggestions
}
