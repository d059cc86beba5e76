//! Critical-chain analysis: leveling, chain extraction and buffer sizing.

use thiserror::Error;

use crate::buffer::rss_buffer_minutes;
use crate::chain::{extract_critical_chain, identify_feeding_chains};
use crate::config::AnalysisConfig;
use crate::graph::{GraphError, TaskGraph};
use crate::interner::NodeId;
use crate::leveling::{level_resources, LevelingOutcome};
use crate::models::{
    CriticalChainAnalysis, DependencyEdge, FeedingBuffer, FeedingChain, Minutes, ScheduledTask,
    TaskNode,
};
use crate::log_checks;

/// Errors that can occur during analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Insufficient data: the project has no tasks")]
    InsufficientData,
    #[error("No dependencies: {task_count} tasks but no ordering constraints between them")]
    NoDependencies { task_count: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Validate the snapshot and run the leveling pipeline.
pub(crate) fn level_snapshot(
    tasks: &[TaskNode],
    dependencies: &[DependencyEdge],
    verbosity: u8,
) -> Result<LevelingOutcome, AnalysisError> {
    if tasks.is_empty() {
        return Err(AnalysisError::InsufficientData);
    }
    let graph = TaskGraph::new(tasks, dependencies);
    if graph.edge_count() == 0 {
        return Err(AnalysisError::NoDependencies {
            task_count: graph.node_count(),
        });
    }
    Ok(level_resources(tasks, graph, verbosity)?)
}

/// Build the caller-facing result from a leveling outcome.
pub(crate) fn summarize(tasks: &[TaskNode], outcome: &LevelingOutcome, verbosity: u8) -> CriticalChainAnalysis {
    let graph = &outcome.augmented;
    let schedule = &outcome.leveled;
    let by_node = graph.node_tasks(tasks);

    let scheduled = |node: NodeId| {
        let task = by_node[node as usize];
        ScheduledTask {
            task_id: task.id.clone(),
            title: task.title.clone(),
            optimistic_minutes: task.optimistic_minutes,
            pessimistic_minutes: task.pessimistic_minutes,
            timing: *schedule.timing(node),
        }
    };
    let estimates = |nodes: &[NodeId]| -> Vec<(Minutes, Minutes)> {
        nodes
            .iter()
            .map(|&n| (by_node[n as usize].optimistic_minutes, by_node[n as usize].pessimistic_minutes))
            .collect()
    };

    let chain_nodes = extract_critical_chain(schedule);
    let branches = identify_feeding_chains(graph, schedule, &chain_nodes);

    let project_buffer_minutes = rss_buffer_minutes(estimates(&chain_nodes));
    let chain_finish = chain_nodes
        .iter()
        .map(|&n| schedule.timing(n).early_finish)
        .max()
        .unwrap_or(0);

    let mut feeding_chains = Vec::with_capacity(branches.len());
    let mut feeding_buffers = Vec::with_capacity(branches.len());
    for branch in &branches {
        let merge_task_id = by_node[branch.merge_node as usize].id.clone();
        feeding_buffers.push(FeedingBuffer {
            merge_task_id: merge_task_id.clone(),
            buffer_minutes: rss_buffer_minutes(estimates(&branch.nodes)),
        });
        feeding_chains.push(FeedingChain {
            merge_task_id,
            tasks: branch.nodes.iter().map(|&n| scheduled(n)).collect(),
        });
    }

    log_checks!(
        verbosity,
        "Critical chain: {} tasks finishing at {}, project buffer {}, {} feeding chains",
        chain_nodes.len(),
        chain_finish,
        project_buffer_minutes,
        feeding_chains.len()
    );

    CriticalChainAnalysis {
        critical_chain: chain_nodes.iter().map(|&n| scheduled(n)).collect(),
        feeding_chains,
        project_buffer_minutes,
        feeding_buffers,
        total_project_duration_minutes: chain_finish + project_buffer_minutes,
        schedule: (0..graph.node_count() as NodeId).map(scheduled).collect(),
        synthetic_edges: outcome
            .synthetic_edges
            .iter()
            .map(|edge| graph.to_dependency_edge(edge))
            .collect(),
    }
}

/// Run a full critical-chain analysis over a task snapshot.
///
/// The snapshot must be acyclic with unique edges per ordered pair; both are
/// enforced by the caller.
///
/// # Errors
/// * `InsufficientData` if `tasks` is empty
/// * `NoDependencies` if no edge connects two known tasks
/// * `Graph` if the (augmented) graph turns out to be cyclic
pub fn analyze_critical_chain(
    tasks: &[TaskNode],
    dependencies: &[DependencyEdge],
    config: &AnalysisConfig,
) -> Result<CriticalChainAnalysis, AnalysisError> {
    let outcome = level_snapshot(tasks, dependencies, config.verbosity)?;
    Ok(summarize(tasks, &outcome, config.verbosity))
}
