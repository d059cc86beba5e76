//! Critical chain extraction and feeding chain identification.

use std::collections::VecDeque;

use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::schedule::Schedule;

/// A non-critical branch, as node indices, merging into `merge_node`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedingBranch {
    pub merge_node: NodeId,
    /// Ordered by early start, ties in snapshot order.
    pub nodes: Vec<NodeId>,
}

/// Zero-float nodes ordered by early start (ties keep snapshot order).
pub fn extract_critical_chain(schedule: &Schedule) -> Vec<NodeId> {
    let mut chain: Vec<NodeId> = (0..schedule.len() as NodeId)
        .filter(|&node| schedule.timing(node).is_critical())
        .collect();
    chain.sort_by_key(|&node| schedule.timing(node).early_start);
    chain
}

/// Trace non-critical branches feeding the critical chain.
///
/// Walks the chain in order; for each incoming edge from a non-critical,
/// not yet visited predecessor, collects everything reachable backwards
/// through non-critical nodes. A node is attributed to at most one branch:
/// the first merge point that reaches it.
pub fn identify_feeding_chains(
    graph: &TaskGraph,
    schedule: &Schedule,
    critical_chain: &[NodeId],
) -> Vec<FeedingBranch> {
    let n = graph.node_count();
    let mut critical = vec![false; n];
    for &node in critical_chain {
        critical[node as usize] = true;
    }

    let mut visited = vec![false; n];
    let mut branches = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for &merge_node in critical_chain {
        for entry in graph.incoming(merge_node) {
            let start = entry.from as usize;
            if critical[start] || visited[start] {
                continue;
            }

            visited[start] = true;
            queue.push_back(entry.from);
            let mut nodes = Vec::new();

            while let Some(node) = queue.pop_front() {
                nodes.push(node);
                for edge in graph.incoming(node) {
                    let pred = edge.from as usize;
                    if !critical[pred] && !visited[pred] {
                        visited[pred] = true;
                        queue.push_back(edge.from);
                    }
                }
            }

            nodes.sort_by_key(|&node| schedule.timing(node).early_start);
            branches.push(FeedingBranch { merge_node, nodes });
        }
    }

    branches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DependencyEdge, TaskNode};
    use crate::schedule::{optimistic_durations, schedule_graph};

    fn analyze(tasks: &[TaskNode], edges: &[DependencyEdge]) -> (TaskGraph, Schedule) {
        let graph = TaskGraph::new(tasks, edges);
        let durations = optimistic_durations(&graph, tasks);
        let schedule = schedule_graph(&graph, &durations).unwrap();
        (graph, schedule)
    }

    fn names(graph: &TaskGraph, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| graph.index().name(n).to_string())
            .collect()
    }

    fn fs(a: &str, b: &str) -> DependencyEdge {
        DependencyEdge::finish_to_start(a, b)
    }

    #[test]
    fn test_chain_sorted_by_early_start() {
        // Snapshot order deliberately scrambled
        let tasks = vec![
            TaskNode::new("c", 30, 90),
            TaskNode::new("a", 60, 120),
            TaskNode::new("b", 120, 240),
        ];
        let (graph, schedule) = analyze(&tasks, &[fs("a", "b"), fs("b", "c")]);
        let chain = extract_critical_chain(&schedule);
        assert_eq!(names(&graph, &chain), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_feeding_chain() {
        let tasks = vec![
            TaskNode::new("a", 60, 120),
            TaskNode::new("b", 120, 240),
            TaskNode::new("c", 90, 150),
            TaskNode::new("d", 30, 90),
        ];
        let edges = [fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let (graph, schedule) = analyze(&tasks, &edges);

        let chain = extract_critical_chain(&schedule);
        assert_eq!(names(&graph, &chain), vec!["a", "b", "d"]);

        let feeding = identify_feeding_chains(&graph, &schedule, &chain);
        assert_eq!(feeding.len(), 1);
        assert_eq!(graph.index().name(feeding[0].merge_node), "d");
        assert_eq!(names(&graph, &feeding[0].nodes), vec!["c"]);
    }

    #[test]
    fn test_branch_collects_transitive_predecessors() {
        // x -> y -> m (m critical), with the long chain s -> t -> m
        let tasks = vec![
            TaskNode::new("s", 100, 100),
            TaskNode::new("t", 100, 100),
            TaskNode::new("x", 20, 40),
            TaskNode::new("y", 20, 40),
            TaskNode::new("m", 10, 20),
        ];
        let edges = [fs("s", "t"), fs("t", "m"), fs("x", "y"), fs("y", "m")];
        let (graph, schedule) = analyze(&tasks, &edges);

        let chain = extract_critical_chain(&schedule);
        let feeding = identify_feeding_chains(&graph, &schedule, &chain);

        assert_eq!(feeding.len(), 1);
        assert_eq!(names(&graph, &feeding[0].nodes), vec!["x", "y"]);
    }

    #[test]
    fn test_shared_branch_attributed_once() {
        // f feeds both m1 and m2 on the chain s -> m1 -> m2
        let tasks = vec![
            TaskNode::new("s", 100, 100),
            TaskNode::new("m1", 100, 100),
            TaskNode::new("m2", 100, 100),
            TaskNode::new("f", 10, 30),
        ];
        let edges = [fs("s", "m1"), fs("m1", "m2"), fs("f", "m1"), fs("f", "m2")];
        let (graph, schedule) = analyze(&tasks, &edges);

        let chain = extract_critical_chain(&schedule);
        let feeding = identify_feeding_chains(&graph, &schedule, &chain);

        assert_eq!(feeding.len(), 1);
        assert_eq!(graph.index().name(feeding[0].merge_node), "m1");
        assert_eq!(names(&graph, &feeding[0].nodes), vec!["f"]);
    }

    #[test]
    fn test_separate_predecessors_give_separate_branches() {
        let tasks = vec![
            TaskNode::new("s", 100, 100),
            TaskNode::new("p", 10, 20),
            TaskNode::new("q", 20, 30),
            TaskNode::new("m", 10, 10),
        ];
        let edges = [fs("s", "m"), fs("p", "m"), fs("q", "m")];
        let (graph, schedule) = analyze(&tasks, &edges);

        let chain = extract_critical_chain(&schedule);
        let feeding = identify_feeding_chains(&graph, &schedule, &chain);

        assert_eq!(feeding.len(), 2);
        assert_eq!(names(&graph, &feeding[0].nodes), vec!["p"]);
        assert_eq!(names(&graph, &feeding[1].nodes), vec!["q"]);
    }

    #[test]
    fn test_no_feeding_chains_on_pure_chain() {
        let tasks = vec![TaskNode::new("a", 10, 20), TaskNode::new("b", 10, 20)];
        let (graph, schedule) = analyze(&tasks, &[fs("a", "b")]);
        let chain = extract_critical_chain(&schedule);
        assert!(identify_feeding_chains(&graph, &schedule, &chain).is_empty());
    }
}
