//! CPM schedule engine: forward and backward passes over typed edges.
//!
//! Each call returns a fresh [`Schedule`]; nothing is written back into the
//! task snapshot, so the engine can run repeatedly over different edge sets.

use std::ops::{Add, Sub};

use crate::graph::{GraphError, TaskGraph};
use crate::interner::NodeId;
use crate::models::{DependencyType, Minutes, NodeTiming, TaskNode};

/// Numeric type a forward pass can run on.
///
/// Deterministic schedules use whole minutes; Monte Carlo trials use `f64`
/// sampled durations. Both share the per-relation formulas.
pub trait TimeUnit: Copy + Default + PartialOrd + Add<Output = Self> + Sub<Output = Self> {
    fn from_minutes(minutes: Minutes) -> Self;
}

impl TimeUnit for Minutes {
    #[inline]
    fn from_minutes(minutes: Minutes) -> Self {
        minutes
    }
}

impl TimeUnit for f64 {
    #[inline]
    fn from_minutes(minutes: Minutes) -> Self {
        minutes as f64
    }
}

/// Computed timings for every node of a graph, indexed by [`NodeId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    timings: Vec<NodeTiming>,
    project_end: Minutes,
}

impl Schedule {
    #[inline]
    pub fn timing(&self, node: NodeId) -> &NodeTiming {
        &self.timings[node as usize]
    }

    pub fn timings(&self) -> &[NodeTiming] {
        &self.timings
    }

    /// Latest early finish over all nodes.
    pub fn project_end(&self) -> Minutes {
        self.project_end
    }

    pub fn len(&self) -> usize {
        self.timings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }
}

/// Deterministic durations (optimistic estimates) in node order.
pub fn optimistic_durations(graph: &TaskGraph, tasks: &[TaskNode]) -> Vec<Minutes> {
    graph
        .node_tasks(tasks)
        .into_iter()
        .map(|task| task.optimistic_minutes)
        .collect()
}

/// Forward pass in topological order. Fills `early_start`/`early_finish` and
/// returns the latest early finish.
pub fn forward_pass<T: TimeUnit>(
    graph: &TaskGraph,
    order: &[NodeId],
    durations: &[T],
    early_start: &mut [T],
    early_finish: &mut [T],
) -> T {
    let mut project_end = T::default();

    for &node in order {
        let idx = node as usize;
        let duration = durations[idx];

        let mut start = T::default();
        for edge in graph.incoming(node) {
            let pred = edge.from as usize;
            let bound = edge.kind.earliest_start(
                early_start[pred],
                early_finish[pred],
                T::from_minutes(edge.lag),
                duration,
            );
            if bound > start {
                start = bound;
            }
        }

        let finish = start + duration;
        early_start[idx] = start;
        early_finish[idx] = finish;
        if finish > project_end {
            project_end = finish;
        }
    }

    project_end
}

/// Full CPM pass over `graph` using a precomputed topological `order`.
pub fn compute_schedule(graph: &TaskGraph, order: &[NodeId], durations: &[Minutes]) -> Schedule {
    let n = graph.node_count();
    let mut early_start = vec![0; n];
    let mut early_finish = vec![0; n];
    let project_end = forward_pass(graph, order, durations, &mut early_start, &mut early_finish);

    let mut late_start: Vec<Minutes> = durations.iter().map(|d| project_end - d).collect();
    let mut late_finish = vec![project_end; n];
    let mut timings = vec![NodeTiming::default(); n];

    for &node in order.iter().rev() {
        let idx = node as usize;
        let duration = durations[idx];

        for edge in graph.outgoing(node) {
            let succ = edge.to as usize;
            match edge.kind {
                DependencyType::FinishToStart => {
                    late_finish[idx] = late_finish[idx].min(late_start[succ] - edge.lag);
                }
                DependencyType::StartToStart => {
                    late_start[idx] = late_start[idx].min(late_start[succ] - edge.lag);
                }
                DependencyType::FinishToFinish => {
                    late_finish[idx] = late_finish[idx].min(late_finish[succ] - edge.lag);
                }
                DependencyType::StartToFinish => {
                    late_start[idx] = late_start[idx].min(late_finish[succ] - edge.lag);
                }
            }
        }
        late_start[idx] = late_start[idx].min(late_finish[idx] - duration);

        timings[idx] = NodeTiming {
            early_start: early_start[idx],
            early_finish: early_finish[idx],
            late_start: late_start[idx],
            late_finish: late_finish[idx],
            total_float: late_start[idx] - early_start[idx],
        };
    }

    Schedule {
        timings,
        project_end,
    }
}

/// Order the graph and run the full CPM pass.
pub fn schedule_graph(graph: &TaskGraph, durations: &[Minutes]) -> Result<Schedule, GraphError> {
    let order = graph.topological_order()?;
    Ok(compute_schedule(graph, &order, durations))
}
