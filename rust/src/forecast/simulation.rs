//! Monte Carlo trials over the leveled graph.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::graph::TaskGraph;
use crate::interner::NodeId;
use crate::leveling::LevelingOutcome;
use crate::models::TaskNode;
use crate::schedule::forward_pass;

use super::sampling::sample_duration;

/// Odd constant spreading consecutive trial indices across the seed space.
const TRIAL_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of the generator used for trial `trial` of a run seeded with `seed`.
#[inline]
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    seed ^ (trial as u64).wrapping_add(1).wrapping_mul(TRIAL_SEED_STRIDE)
}

/// Per-worker buffers reused across trials.
struct TrialScratch {
    durations: Vec<f64>,
    early_start: Vec<f64>,
    early_finish: Vec<f64>,
}

impl TrialScratch {
    fn new(n: usize) -> Self {
        Self {
            durations: vec![0.0; n],
            early_start: vec![0.0; n],
            early_finish: vec![0.0; n],
        }
    }
}

/// Read-only inputs shared by every trial: the augmented graph, its
/// topological order and the per-node estimates.
#[derive(Clone, Debug)]
pub struct SimulationModel {
    graph: TaskGraph,
    order: Vec<NodeId>,
    /// `(optimistic, pessimistic)` in node order.
    estimates: Vec<(f64, f64)>,
}

impl SimulationModel {
    pub fn new(graph: TaskGraph, order: Vec<NodeId>, tasks: &[TaskNode]) -> Self {
        let estimates = graph
            .node_tasks(tasks)
            .into_iter()
            .map(|task| (task.optimistic_minutes as f64, task.pessimistic_minutes as f64))
            .collect();
        Self {
            graph,
            order,
            estimates,
        }
    }

    /// Build from a leveling run, reusing its augmented graph and order.
    pub fn from_leveling(outcome: &LevelingOutcome, tasks: &[TaskNode]) -> Self {
        Self::new(outcome.augmented.clone(), outcome.order.clone(), tasks)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn run_trial_with<R: Rng + ?Sized>(&self, rng: &mut R, scratch: &mut TrialScratch) -> f64 {
        for (slot, &(optimistic, pessimistic)) in scratch.durations.iter_mut().zip(&self.estimates) {
            *slot = sample_duration(rng, optimistic, pessimistic);
        }
        forward_pass(
            &self.graph,
            &self.order,
            &scratch.durations,
            &mut scratch.early_start,
            &mut scratch.early_finish,
        )
    }

    /// One trial: sample every duration, forward pass, return the completion
    /// time.
    pub fn run_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut scratch = TrialScratch::new(self.node_count());
        self.run_trial_with(rng, &mut scratch)
    }

    /// Completion times of `trials` trials, sorted ascending.
    ///
    /// Trial `i` draws from its own generator seeded with
    /// [`trial_seed`]`(seed, i)`, so the result depends only on `seed` and
    /// `trials`, not on `parallel`.
    pub fn completion_times(&self, trials: usize, seed: u64, parallel: bool) -> Vec<f64> {
        let n = self.node_count();
        let run = |scratch: &mut TrialScratch, trial: usize| {
            let mut rng = StdRng::seed_from_u64(trial_seed(seed, trial));
            self.run_trial_with(&mut rng, scratch)
        };

        let mut times: Vec<f64> = if parallel {
            (0..trials)
                .into_par_iter()
                .map_init(|| TrialScratch::new(n), run)
                .collect()
        } else {
            let mut scratch = TrialScratch::new(n);
            (0..trials).map(|trial| run(&mut scratch, trial)).collect()
        };

        times.sort_by(f64::total_cmp);
        times
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyEdge;

    fn chain_model(tasks: &[TaskNode]) -> SimulationModel {
        let edges: Vec<DependencyEdge> = tasks
            .windows(2)
            .map(|w| DependencyEdge::finish_to_start(w[0].id.as_str(), w[1].id.as_str()))
            .collect();
        let graph = TaskGraph::new(tasks, &edges);
        let order = graph.topological_order().unwrap();
        SimulationModel::new(graph, order, tasks)
    }

    #[test]
    fn test_same_seed_same_times() {
        let model = chain_model(&[
            TaskNode::new("a", 60, 120),
            TaskNode::new("b", 120, 240),
            TaskNode::new("c", 30, 90),
        ]);
        let first = model.completion_times(300, 1234, false);
        let second = model.completion_times(300, 1234, false);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = chain_model(&[
            TaskNode::new("a", 10, 100),
            TaskNode::new("b", 20, 40),
            TaskNode::new("c", 5, 500),
        ]);
        let sequential = model.completion_times(500, 99, false);
        let parallel = model.completion_times(500, 99, true);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_different_seeds_differ() {
        let model = chain_model(&[TaskNode::new("a", 10, 1000), TaskNode::new("b", 10, 1000)]);
        assert_ne!(
            model.completion_times(200, 1, false),
            model.completion_times(200, 2, false)
        );
    }

    #[test]
    fn test_fixed_estimates_give_constant_completion() {
        let model = chain_model(&[TaskNode::new("a", 60, 60), TaskNode::new("b", 30, 30)]);
        let times = model.completion_times(150, 5, false);
        assert_eq!(times.len(), 150);
        assert!(times.iter().all(|&t| t == 90.0));
    }

    #[test]
    fn test_trial_bounded_by_estimates() {
        let tasks = [TaskNode::new("a", 60, 120), TaskNode::new("b", 120, 240)];
        let model = chain_model(&tasks);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let t = model.run_trial(&mut rng);
            assert!((180.0..=360.0).contains(&t));
        }
    }

    #[test]
    fn test_trial_seeds_are_distinct() {
        let seeds: Vec<u64> = (0..64).map(|i| trial_seed(0, i)).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
    }
}
