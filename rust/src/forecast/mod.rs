//! Monte Carlo completion forecasting.
//!
//! Trials reuse the leveled graph and its topological order; only the sampled
//! durations change between trials. The deterministic duration reported next
//! to the distribution comes from the critical-chain analysis, not from the
//! trials, so it need not match p50.

mod sampling;
mod simulation;
mod stats;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use thiserror::Error;

use crate::analysis::{level_snapshot, summarize, AnalysisError};
use crate::config::{ForecastConfig, MIN_SIMULATIONS};
use crate::models::{DependencyEdge, Minutes, TaskNode};
use crate::{log_changes, log_debug};

pub use sampling::{sample_duration, triangular_mode_min};
pub use simulation::{trial_seed, SimulationModel};
pub use stats::{histogram, percentile_minutes, HistogramBin, HISTOGRAM_BINS};

/// Errors that can occur while forecasting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Invalid simulation count {requested}: at least {min} required")]
    InvalidSimulationCount { requested: usize, min: usize },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// A duration with its calendar date when a start was supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PercentileEstimate {
    pub duration_minutes: Minutes,
    pub finish_date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Percentiles {
    pub p50: PercentileEstimate,
    pub p75: PercentileEstimate,
    pub p80: PercentileEstimate,
    pub p90: PercentileEstimate,
    pub p95: PercentileEstimate,
}

impl Percentiles {
    /// `(percent, estimate)` pairs in ascending order.
    pub fn entries(&self) -> [(u32, PercentileEstimate); 5] {
        [
            (50, self.p50),
            (75, self.p75),
            (80, self.p80),
            (90, self.p90),
            (95, self.p95),
        ]
    }
}

/// Outcome of a Monte Carlo forecast.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastResult {
    pub start_date: Option<NaiveDate>,
    /// Leveled critical-chain finish plus the project buffer.
    pub deterministic_duration_minutes: Minutes,
    pub deterministic_finish_date: Option<NaiveDate>,
    pub simulations: usize,
    /// Seed the trials were derived from; pass it back to replay the run.
    pub seed: u64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBin>,
}

/// Calendar date `minutes` after `start`, without working-time adjustment.
pub fn finish_date(start: Option<NaiveDateTime>, minutes: Minutes) -> Option<NaiveDate> {
    start
        .and_then(|s| s.checked_add_signed(Duration::minutes(minutes)))
        .map(|t| t.date())
}

fn validate_simulations(requested: usize) -> Result<(), ForecastError> {
    if requested < MIN_SIMULATIONS {
        return Err(ForecastError::InvalidSimulationCount {
            requested,
            min: MIN_SIMULATIONS,
        });
    }
    Ok(())
}

/// Forecast project completion by Monte Carlo simulation.
///
/// # Errors
/// * `InvalidSimulationCount` if `config.simulations` is below `MIN_SIMULATIONS`
/// * `Analysis` for an empty project, a project without dependencies, or a
///   cyclic graph
pub fn forecast_completion(
    tasks: &[TaskNode],
    dependencies: &[DependencyEdge],
    config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
    validate_simulations(config.simulations)?;
    let verbosity = config.verbosity;

    let outcome = level_snapshot(tasks, dependencies, verbosity)?;
    let deterministic = summarize(tasks, &outcome, verbosity).total_project_duration_minutes;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let model = SimulationModel::from_leveling(&outcome, tasks);
    let sorted = model.completion_times(config.simulations, seed, config.parallel);
    log_debug!(
        verbosity,
        "Forecast: {} trials, fastest {:.1}, slowest {:.1}",
        sorted.len(),
        sorted.first().copied().unwrap_or_default(),
        sorted.last().copied().unwrap_or_default()
    );

    let estimate = |percent: u32| {
        let duration_minutes = percentile_minutes(&sorted, percent);
        PercentileEstimate {
            duration_minutes,
            finish_date: finish_date(config.start, duration_minutes),
        }
    };
    let percentiles = Percentiles {
        p50: estimate(50),
        p75: estimate(75),
        p80: estimate(80),
        p90: estimate(90),
        p95: estimate(95),
    };

    log_changes!(
        verbosity,
        "Forecast (seed {}): deterministic {}, p50 {}, p90 {}",
        seed,
        deterministic,
        percentiles.p50.duration_minutes,
        percentiles.p90.duration_minutes
    );

    Ok(ForecastResult {
        start_date: config.start.map(|s| s.date()),
        deterministic_duration_minutes: deterministic,
        deterministic_finish_date: finish_date(config.start, deterministic),
        simulations: config.simulations,
        seed,
        percentiles,
        histogram: histogram(&sorted),
    })
}
