//! Resource leveling by serializing same-assignee overlaps.
//!
//! The pipeline is explicit: a baseline schedule on the caller's edges, a
//! single augmentation pass that injects finish-to-start edges between
//! overlapping neighbours of each assignee group, and one re-schedule on the
//! augmented graph. A pair is never linked against an existing path, so the
//! augmented graph stays acyclic. Overlaps that only appear after
//! re-scheduling, or overlaps between non-adjacent members of a group, are
//! left as they are.

use rustc_hash::FxHashMap;

use crate::graph::{GraphEdge, GraphError, TaskGraph};
use crate::interner::NodeId;
use crate::models::TaskNode;
use crate::schedule::{compute_schedule, optimistic_durations, Schedule};
use crate::{log_changes, log_checks, log_debug};

/// Everything produced by one leveling run.
#[derive(Clone, Debug)]
pub struct LevelingOutcome {
    /// Schedule of the caller's edges alone.
    pub baseline: Schedule,
    /// Caller's edges plus the synthetic ones.
    pub augmented: TaskGraph,
    /// Topological order of `augmented`.
    pub order: Vec<NodeId>,
    /// Edges injected by the augmentation pass, in insertion order.
    pub synthetic_edges: Vec<GraphEdge>,
    /// Schedule of `augmented`; equal to `baseline` when nothing was injected.
    pub leveled: Schedule,
}

impl LevelingOutcome {
    pub fn was_leveled(&self) -> bool {
        !self.synthetic_edges.is_empty()
    }
}

/// Group node ids by assignee, groups and members in snapshot order.
fn assignee_groups<'a>(graph: &TaskGraph, tasks: &'a [TaskNode]) -> Vec<(&'a str, Vec<NodeId>)> {
    let mut slots: FxHashMap<&'a str, usize> = FxHashMap::default();
    let mut groups: Vec<(&'a str, Vec<NodeId>)> = Vec::new();

    for task in tasks {
        let Some(node) = graph.index().node(&task.id) else {
            continue;
        };
        for assignee in &task.assignee_ids {
            let slot = *slots.entry(assignee.as_str()).or_insert_with(|| {
                groups.push((assignee.as_str(), Vec::new()));
                groups.len() - 1
            });
            let members = &mut groups[slot].1;
            if members.last() != Some(&node) {
                members.push(node);
            }
        }
    }

    groups
}

/// Inject synthetic edges into `graph` based on `baseline`. Returns the edges
/// that were added.
pub fn augment_edges(
    graph: &mut TaskGraph,
    tasks: &[TaskNode],
    baseline: &Schedule,
    verbosity: u8,
) -> Vec<GraphEdge> {
    let mut added = Vec::new();

    for (assignee, mut members) in assignee_groups(graph, tasks) {
        if members.len() < 2 {
            continue;
        }
        // Stable: equal early starts keep snapshot order.
        members.sort_by_key(|&node| baseline.timing(node).early_start);

        for pair in members.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ta, tb) = (baseline.timing(a), baseline.timing(b));
            if ta.early_finish <= tb.early_start {
                continue;
            }
            if graph.reaches(b, a) {
                log_debug!(
                    verbosity,
                    "Leveling {}: {} overlaps {} but already depends on it",
                    assignee,
                    graph.index().name(a),
                    graph.index().name(b)
                );
                continue;
            }
            let edge = GraphEdge::synthetic(a, b);
            if graph.add_edge(edge) {
                log_changes!(
                    verbosity,
                    "Leveling {}: {} ({}..{}) now precedes {} (starts {})",
                    assignee,
                    graph.index().name(a),
                    ta.early_start,
                    ta.early_finish,
                    graph.index().name(b),
                    tb.early_start
                );
                added.push(edge);
            } else {
                log_debug!(
                    verbosity,
                    "Leveling {}: {} and {} overlap but are already linked",
                    assignee,
                    graph.index().name(a),
                    graph.index().name(b)
                );
            }
        }
    }

    added
}

/// Run the baseline schedule, one augmentation pass and (if anything changed)
/// one re-schedule.
pub fn level_resources(
    tasks: &[TaskNode],
    mut graph: TaskGraph,
    verbosity: u8,
) -> Result<LevelingOutcome, GraphError> {
    let durations = optimistic_durations(&graph, tasks);
    let baseline_order = graph.topological_order()?;
    let baseline = compute_schedule(&graph, &baseline_order, &durations);

    let synthetic_edges = augment_edges(&mut graph, tasks, &baseline, verbosity);

    let (order, leveled) = if synthetic_edges.is_empty() {
        (baseline_order, baseline.clone())
    } else {
        let order = graph.topological_order()?;
        let leveled = compute_schedule(&graph, &order, &durations);
        (order, leveled)
    };

    log_checks!(
        verbosity,
        "Leveling: {} synthetic edges, makespan {} -> {}",
        synthetic_edges.len(),
        baseline.project_end(),
        leveled.project_end()
    );

    Ok(LevelingOutcome {
        baseline,
        augmented: graph,
        order,
        synthetic_edges,
        leveled,
    })
}
