//! Indexed dependency graph and Kahn topological ordering.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;

use crate::interner::{NodeId, TaskIndex};
use crate::models::{DependencyEdge, DependencyType, EdgeOrigin, Minutes, TaskNode};

/// Errors raised while ordering the graph.
///
/// Acyclicity is a caller precondition, so this only fires on contract
/// violations upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Circular dependency detected: {ordered} of {total} tasks could be ordered")]
    CyclicGraph { ordered: usize, total: usize },
}

/// An edge between two indexed nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: DependencyType,
    pub lag: Minutes,
    pub origin: EdgeOrigin,
}

impl GraphEdge {
    /// Finish-to-start, zero-lag edge injected by the leveler.
    pub fn synthetic(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            kind: DependencyType::FinishToStart,
            lag: 0,
            origin: EdgeOrigin::Synthetic,
        }
    }
}

/// Dependency graph over a task snapshot.
///
/// Edges are stored once; `incoming`/`outgoing` hold indices into `edges`
/// so a node's constraints are visited in insertion order.
#[derive(Clone, Debug)]
pub struct TaskGraph {
    index: TaskIndex,
    edges: Vec<GraphEdge>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    /// Ordered (from, to) pairs present in `edges`.
    pairs: FxHashSet<(NodeId, NodeId)>,
}

impl TaskGraph {
    /// Build the graph for a task snapshot. Edges touching unknown tasks are
    /// ignored.
    pub fn new(tasks: &[TaskNode], edges: &[DependencyEdge]) -> Self {
        Self::from_ids(tasks.iter().map(|t| t.id.as_str()), edges)
    }

    pub fn from_ids<'a, I>(ids: I, edges: &[DependencyEdge]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let index = TaskIndex::from_ids(ids);
        let n = index.len();
        let mut graph = Self {
            index,
            edges: Vec::with_capacity(edges.len()),
            incoming: vec![Vec::new(); n],
            outgoing: vec![Vec::new(); n],
            pairs: FxHashSet::with_capacity_and_hasher(edges.len(), Default::default()),
        };

        for edge in edges {
            let (Some(from), Some(to)) = (
                graph.index.node(&edge.predecessor_id),
                graph.index.node(&edge.successor_id),
            ) else {
                continue;
            };
            graph.push(GraphEdge {
                from,
                to,
                kind: edge.dependency_type,
                lag: edge.lag_minutes,
                origin: edge.origin,
            });
        }

        graph
    }

    fn push(&mut self, edge: GraphEdge) {
        let slot = self.edges.len();
        self.pairs.insert((edge.from, edge.to));
        self.incoming[edge.to as usize].push(slot);
        self.outgoing[edge.from as usize].push(slot);
        self.edges.push(edge);
    }

    /// Add an edge unless the two nodes are already connected (either
    /// direction) or it would be a self-loop. Returns whether it was added.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if edge.from == edge.to || self.connected(edge.from, edge.to) {
            return false;
        }
        self.push(edge);
        true
    }

    /// Whether a direct edge exists between `a` and `b` in either direction.
    #[inline]
    pub fn connected(&self, a: NodeId, b: NodeId) -> bool {
        self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a))
    }

    pub fn index(&self) -> &TaskIndex {
        &self.index
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.incoming[node as usize].iter().map(|&slot| &self.edges[slot])
    }

    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.outgoing[node as usize].iter().map(|&slot| &self.edges[slot])
    }

    /// Whether `to` is reachable from `from` along outgoing edges.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![false; self.node_count()];
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        seen[from as usize] = true;
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            for edge in self.outgoing(node) {
                if edge.to == to {
                    return true;
                }
                let next = edge.to as usize;
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(edge.to);
                }
            }
        }
        false
    }

    /// The task behind each node, in node order. A repeated id resolves to
    /// its first occurrence, matching the index.
    pub fn node_tasks<'a>(&self, tasks: &'a [TaskNode]) -> Vec<&'a TaskNode> {
        let mut by_node: Vec<Option<&TaskNode>> = vec![None; self.node_count()];
        for task in tasks {
            if let Some(node) = self.index.node(&task.id) {
                by_node[node as usize].get_or_insert(task);
            }
        }
        // every node was created from a task
        by_node.into_iter().flatten().collect()
    }

    /// Convert an indexed edge back to its string-keyed form.
    pub fn to_dependency_edge(&self, edge: &GraphEdge) -> DependencyEdge {
        DependencyEdge {
            predecessor_id: self.index.name(edge.from).to_string(),
            successor_id: self.index.name(edge.to).to_string(),
            dependency_type: edge.kind,
            lag_minutes: edge.lag,
            origin: edge.origin,
        }
    }

    /// Kahn's algorithm. Nodes with no predecessors are seeded in snapshot
    /// order, so the result is deterministic for a given input.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let n = self.node_count();
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();

        let mut queue: VecDeque<NodeId> = (0..n as NodeId)
            .filter(|&node| in_degree[node as usize] == 0)
            .collect();
        let mut order: Vec<NodeId> = Vec::with_capacity(n);

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for edge in self.outgoing(node) {
                let succ = edge.to as usize;
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(edge.to);
                }
            }
        }

        if order.len() != n {
            return Err(GraphError::CyclicGraph {
                ordered: order.len(),
                total: n,
            });
        }

        Ok(order)
    }
}

/// Order task ids so every edge points forward. Edges whose endpoints are not
/// both in `ids` are ignored.
pub fn topological_sort<'a, I>(ids: I, edges: &[DependencyEdge]) -> Result<Vec<String>, GraphError>
where
    I: IntoIterator<Item = &'a str>,
{
    let graph = TaskGraph::from_ids(ids, edges);
    let order = graph.topological_order()?;
    Ok(order
        .into_iter()
        .map(|node| graph.index().name(node).to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs(a: &str, b: &str) -> DependencyEdge {
        DependencyEdge::finish_to_start(a, b)
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|x| x == id).unwrap()
    }

    #[test]
    fn test_chain_order() {
        let order = topological_sort(["c", "b", "a"], &[fs("a", "b"), fs("b", "c")]).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_respects_every_edge() {
        let edges = [fs("a", "b"), fs("a", "c"), fs("b", "d"), fs("c", "d")];
        let order = topological_sort(["d", "c", "b", "a"], &edges).unwrap();

        assert_eq!(order.len(), 4);
        for edge in &edges {
            assert!(position(&order, &edge.predecessor_id) < position(&order, &edge.successor_id));
        }
    }

    #[test]
    fn test_independent_nodes_keep_input_order() {
        let order = topological_sort(["x", "y", "z"], &[]).unwrap();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_edges_outside_task_set_ignored() {
        let order = topological_sort(["a", "b"], &[fs("a", "b"), fs("ghost", "a")]).unwrap();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_detected() {
        let result = topological_sort(["a", "b", "c"], &[fs("a", "b"), fs("b", "a")]);
        assert_eq!(
            result,
            Err(GraphError::CyclicGraph {
                ordered: 1,
                total: 3
            })
        );
    }

    #[test]
    fn test_reaches_follows_paths() {
        let graph = TaskGraph::from_ids(["a", "b", "c", "d"], &[fs("a", "b"), fs("b", "c")]);

        assert!(graph.reaches(0, 2));
        assert!(graph.reaches(1, 1));
        assert!(!graph.reaches(2, 0));
        assert!(!graph.reaches(0, 3));
    }

    #[test]
    fn test_node_tasks_keep_first_occurrence() {
        let tasks = vec![
            TaskNode::new("a", 10, 20),
            TaskNode::new("b", 30, 40),
            TaskNode::new("a", 99, 99),
        ];
        let graph = TaskGraph::new(&tasks, &[fs("a", "b")]);
        let by_node = graph.node_tasks(&tasks);

        assert_eq!(by_node.len(), 2);
        assert_eq!(by_node[0].optimistic_minutes, 10);
        assert_eq!(by_node[1].id, "b");
    }

    #[test]
    fn test_add_edge_rejects_existing_pair_in_either_direction() {
        let mut graph = TaskGraph::from_ids(["a", "b", "c"], &[fs("a", "b")]);

        assert!(!graph.add_edge(GraphEdge::synthetic(0, 1)));
        assert!(!graph.add_edge(GraphEdge::synthetic(1, 0)));
        assert!(!graph.add_edge(GraphEdge::synthetic(2, 2)));
        assert!(graph.add_edge(GraphEdge::synthetic(1, 2)));
        assert!(!graph.add_edge(GraphEdge::synthetic(2, 1)));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.incoming(2).count(), 1);
        assert_eq!(graph.outgoing(1).count(), 1);

        let back = graph.to_dependency_edge(&graph.edges()[1]);
        assert_eq!(back.predecessor_id, "b");
        assert_eq!(back.successor_id, "c");
        assert!(back.is_synthetic());
    }
}
