//! Core data types: task snapshot, dependency edges and computed results.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Minute offset from the conceptual project start (t = 0).
pub type Minutes = i64;

/// A task as handed over by the caller. Read-only inside the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskNode {
    pub id: String,
    /// Display only.
    pub title: String,
    pub optimistic_minutes: Minutes,
    pub pessimistic_minutes: Minutes,
    pub assignee_ids: Vec<String>,
}

impl TaskNode {
    pub fn new(id: impl Into<String>, optimistic_minutes: Minutes, pessimistic_minutes: Minutes) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            optimistic_minutes,
            pessimistic_minutes,
            assignee_ids: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignee_ids = assignees.into_iter().map(Into::into).collect();
        self
    }

    /// Pessimistic minus optimistic estimate.
    pub fn spread_minutes(&self) -> Minutes {
        self.pessimistic_minutes - self.optimistic_minutes
    }
}

/// Precedence relation between two tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DependencyType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl DependencyType {
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Earliest start the successor may take given this constraint.
    ///
    /// `duration` is the successor's duration; finish-anchored relations
    /// subtract it to turn a finish bound into a start bound.
    #[inline]
    pub fn earliest_start<T>(self, pred_start: T, pred_finish: T, lag: T, duration: T) -> T
    where
        T: Copy + Add<Output = T> + Sub<Output = T>,
    {
        match self {
            Self::FinishToStart => pred_finish + lag,
            Self::StartToStart => pred_start + lag,
            Self::FinishToFinish => pred_finish + lag - duration,
            Self::StartToFinish => pred_start + lag - duration,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dependency type: {0:?} (expected FS, SS, FF or SF)")]
pub struct ParseDependencyTypeError(pub String);

impl FromStr for DependencyType {
    type Err = ParseDependencyTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS" | "FINISH_TO_START" => Ok(Self::FinishToStart),
            "SS" | "START_TO_START" => Ok(Self::StartToStart),
            "FF" | "FINISH_TO_FINISH" => Ok(Self::FinishToFinish),
            "SF" | "START_TO_FINISH" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyTypeError(s.to_string())),
        }
    }
}

/// Where an edge came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeOrigin {
    /// Supplied by the caller.
    #[default]
    Original,
    /// Injected by the resource leveler; never persisted.
    Synthetic,
}

/// A precedence constraint between two tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    pub predecessor_id: String,
    pub successor_id: String,
    pub dependency_type: DependencyType,
    /// Negative values are leads.
    pub lag_minutes: Minutes,
    pub origin: EdgeOrigin,
}

impl DependencyEdge {
    pub fn new(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        dependency_type: DependencyType,
        lag_minutes: Minutes,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            dependency_type,
            lag_minutes,
            origin: EdgeOrigin::Original,
        }
    }

    /// Plain finish-to-start edge without lag.
    pub fn finish_to_start(predecessor_id: impl Into<String>, successor_id: impl Into<String>) -> Self {
        Self::new(predecessor_id, successor_id, DependencyType::FinishToStart, 0)
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == EdgeOrigin::Synthetic
    }
}

/// Computed CPM values for one task. `total_float = late_start - early_start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeTiming {
    pub early_start: Minutes,
    pub early_finish: Minutes,
    pub late_start: Minutes,
    pub late_finish: Minutes,
    pub total_float: Minutes,
}

impl NodeTiming {
    pub fn is_critical(&self) -> bool {
        self.total_float == 0
    }
}

/// A task together with its leveled timing, as reported to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task_id: String,
    pub title: String,
    pub optimistic_minutes: Minutes,
    pub pessimistic_minutes: Minutes,
    pub timing: NodeTiming,
}

/// A non-critical branch merging into the critical chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedingChain {
    pub merge_task_id: String,
    /// Ordered by early start.
    pub tasks: Vec<ScheduledTask>,
}

/// Size of the buffer protecting one feeding chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedingBuffer {
    pub merge_task_id: String,
    pub buffer_minutes: Minutes,
}

/// Result of a critical-chain analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalChainAnalysis {
    /// Zero-float tasks ordered by early start.
    pub critical_chain: Vec<ScheduledTask>,
    pub feeding_chains: Vec<FeedingChain>,
    pub project_buffer_minutes: Minutes,
    /// One entry per feeding chain, same order.
    pub feeding_buffers: Vec<FeedingBuffer>,
    /// Latest critical-chain finish plus the project buffer.
    pub total_project_duration_minutes: Minutes,
    /// Leveled timings of every task, in snapshot order.
    pub schedule: Vec<ScheduledTask>,
    /// Orderings the resource leveler introduced.
    pub synthetic_edges: Vec<DependencyEdge>,
}

impl CriticalChainAnalysis {
    /// Latest early finish on the critical chain (the unbuffered duration).
    pub fn critical_chain_finish_minutes(&self) -> Minutes {
        self.critical_chain
            .iter()
            .map(|task| task.timing.early_finish)
            .max()
            .unwrap_or(0)
    }

    pub fn critical_chain_ids(&self) -> Vec<&str> {
        self.critical_chain.iter().map(|t| t.task_id.as_str()).collect()
    }
}
