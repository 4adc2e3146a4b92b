//! Integration coverage for the dependency resolver's public contract:
//! graph construction, cycle detection, topological order, the
//! constraint-application pass and its statistics. Grounded in spirit on
//! the teacher's `tests/dependency_service_tests.rs` (one `#[test]` per
//! resolver behaviour, built against an in-memory fixture rather than a
//! sqlite-backed `DependencyService`), adapted to the arena-of-indices
//! `Graph` this crate builds instead of a `HashMap<String, TaskNode>`.

use dayplan_core::models::instance::InstanceStatus;
use dayplan_core::services::dependency_resolver::{
    apply_constraints, build_graph, detect_cycles, optimize_sequencing, stats, topological_sort,
    ConstraintNode, NodeInput,
};

fn node(id: &str, deps: &[&str]) -> NodeInput {
    NodeInput {
        id: id.to_string(),
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
    }
}

#[test]
fn missing_dependency_is_reported_as_a_warning_not_an_error() {
    let (graph, warnings) = build_graph(&[node("task1", &["ghost"])]);
    assert_eq!(graph.dependencies[0].len(), 0, "unknown id is filtered out of the edge list");
    assert_eq!(warnings.len(), 1);
    assert_eq!(graph.missing_dependencies, vec![(0, "ghost".to_string())]);
}

#[test]
fn self_dependency_produces_an_elementary_cycle() {
    let (graph, _) = build_graph(&[node("task1", &["task1"])]);
    let cycles = detect_cycles(&graph);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0], vec![0, 0]);
}

#[test]
fn three_node_cycle_is_detected() {
    let (graph, _) = build_graph(&[node("task1", &["task2"]), node("task2", &["task3"]), node("task3", &["task1"])]);
    let cycles = detect_cycles(&graph);
    assert!(!cycles.is_empty());
}

#[test]
fn topological_order_respects_a_linear_chain() {
    let (graph, _) = build_graph(&[node("task1", &["task2"]), node("task2", &["task3"]), node("task3", &[])]);
    let order = topological_sort(&graph);

    let pos = |id: &str| order.iter().position(|&i| graph.ids[i] == id).unwrap();
    assert!(pos("task3") < pos("task2"));
    assert!(pos("task2") < pos("task1"));
}

#[test]
fn topological_sort_still_returns_every_node_when_a_cycle_is_present() {
    let (graph, _) = build_graph(&[node("a", &["b"]), node("b", &["a"])]);
    let order = topological_sort(&graph);
    assert_eq!(order.len(), 2);
}

#[test]
fn apply_constraints_blocks_mandatory_task_on_incomplete_dependency() {
    let (graph, _) = build_graph(&[node("dep", &[]), node("task", &["dep"])]);
    let order = topological_sort(&graph);
    let nodes = vec![
        ConstraintNode {
            status: InstanceStatus::Pending,
            is_mandatory: false,
            scheduled_time: Some(9 * 60),
            duration_minutes: 30,
        },
        ConstraintNode {
            status: InstanceStatus::Pending,
            is_mandatory: true,
            scheduled_time: Some(9 * 60 + 45),
            duration_minutes: 30,
        },
    ];

    let result = apply_constraints(&order, &graph, &nodes, 15);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].0, 1);
}

#[test]
fn apply_constraints_suggests_a_buffered_start_when_dependency_runs_long() {
    let (graph, _) = build_graph(&[node("dep", &[]), node("task", &["dep"])]);
    let order = topological_sort(&graph);
    let nodes = vec![
        ConstraintNode {
            status: InstanceStatus::Completed,
            is_mandatory: false,
            scheduled_time: Some(9 * 60),
            duration_minutes: 90, // dep ends at 10:30
        },
        ConstraintNode {
            status: InstanceStatus::Pending,
            is_mandatory: false,
            scheduled_time: Some(10 * 60), // currently starts at 10:00, before dep ends
            duration_minutes: 30,
        },
    ];

    let result = apply_constraints(&order, &graph, &nodes, 15);
    assert!(result.conflicts.is_empty());
    assert_eq!(result.updates.len(), 1);
    assert_eq!(result.updates[0].node, 1);
    assert_eq!(result.updates[0].suggested_start, 10 * 60 + 30 + 15);
    assert_eq!(result.updates[0].reason, "Adjusted for dependency constraints");
}

#[test]
fn stats_reports_depth_and_density_over_a_diamond_graph() {
    // a -> b -> d, a -> c -> d
    let (graph, _) = build_graph(&[
        node("a", &["b", "c"]),
        node("b", &["d"]),
        node("c", &["d"]),
        node("d", &[]),
    ]);
    let summary = stats(&graph);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.with_deps, 3);
    assert_eq!(summary.max_depth, 2);
    assert_eq!(summary.most_dependent_index, Some(graph.index_of("d").unwrap()));
}

#[test]
fn stats_depth_guard_does_not_hang_on_a_cycle() {
    let (graph, _) = build_graph(&[node("a", &["b"]), node("b", &["a"])]);
    let summary = stats(&graph);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.max_depth, 0, "the visited-set cycle guard stops the walk before it recurses forever");
}

#[test]
fn optimize_sequencing_flags_a_start_that_violates_the_buffered_dependency_bound() {
    let (graph, _) = build_graph(&[node("dep", &[]), node("task", &["dep"])]);
    let nodes = vec![
        ConstraintNode {
            status: InstanceStatus::Completed,
            is_mandatory: false,
            scheduled_time: Some(10 * 60),
            duration_minutes: 30, // dep ends at 10:30, earliest legal start is 10:40
        },
        ConstraintNode {
            status: InstanceStatus::Pending,
            is_mandatory: false,
            scheduled_time: Some(10 * 60 + 25), // currently 10:25, 15 min too early
            duration_minutes: 30,
        },
    ];

    let suggestions = optimize_sequencing(&graph, &nodes, 10);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].node, 1);
    assert_eq!(suggestions[0].suggested_start, 10 * 60 + 30 + 10);
    assert_eq!(suggestions[0].improvement_minutes, 15);
}

#[test]
fn optimize_sequencing_is_silent_when_the_current_start_already_respects_the_bound() {
    let (graph, _) = build_graph(&[node("dep", &[]), node("task", &["dep"])]);
    let nodes = vec![
        ConstraintNode {
            status: InstanceStatus::Completed,
            is_mandatory: false,
            scheduled_time: Some(9 * 60),
            duration_minutes: 30, // dep ends at 09:30, earliest legal start is 09:40
        },
        ConstraintNode {
            status: InstanceStatus::Pending,
            is_mandatory: false,
            scheduled_time: Some(10 * 60), // already well after the bound
            duration_minutes: 30,
        },
    ];

    assert!(optimize_sequencing(&graph, &nodes, 10).is_empty());
}
