//! Critical-chain project scheduling engine.
//!
//! Given a snapshot of tasks (optimistic/pessimistic estimates, assignees) and
//! typed precedence constraints, this crate computes a resource-leveled CPM
//! schedule, extracts the critical chain and its feeding chains, sizes
//! root-sum-square buffers, and forecasts completion by Monte Carlo
//! simulation. Everything is a pure computation over caller-owned data.
//!
//! ```
//! use ccpm_rust::{analyze_critical_chain, AnalysisConfig, DependencyEdge, TaskNode};
//!
//! let tasks = vec![TaskNode::new("A", 60, 120), TaskNode::new("B", 120, 240)];
//! let edges = vec![DependencyEdge::finish_to_start("A", "B")];
//! let analysis = analyze_critical_chain(&tasks, &edges, &AnalysisConfig::default()).unwrap();
//! assert_eq!(analysis.critical_chain_ids(), vec!["A", "B"]);
//! ```

pub mod analysis;
pub mod buffer;
pub mod chain;
mod config;
pub mod forecast;
pub mod graph;
pub mod interner;
pub mod leveling;
pub mod logging;
mod models;
pub mod schedule;

#[cfg(feature = "python")]
mod python;

pub use analysis::{analyze_critical_chain, AnalysisError};
pub use buffer::{regenerate_buffers, rss_buffer_minutes, Buffer, BufferKind, BufferStatus, BufferZone};
pub use config::{
    AnalysisConfig, BufferZoneThresholds, ForecastConfig, DEFAULT_SIMULATIONS, MIN_SIMULATIONS,
};
pub use forecast::{
    forecast_completion, ForecastError, ForecastResult, HistogramBin, PercentileEstimate,
    Percentiles,
};
pub use graph::{topological_sort, GraphError, TaskGraph};
pub use leveling::{level_resources, LevelingOutcome};
pub use models::{
    CriticalChainAnalysis, DependencyEdge, DependencyType, EdgeOrigin, FeedingBuffer,
    FeedingChain, Minutes, NodeTiming, ParseDependencyTypeError, ScheduledTask, TaskNode,
};
pub use schedule::{compute_schedule, schedule_graph, Schedule};
