//! Configuration types for analysis and forecasting.

use chrono::NaiveDateTime;

/// Smallest trial count accepted by the forecaster.
pub const MIN_SIMULATIONS: usize = 100;
/// Trial count used when the caller does not pick one.
pub const DEFAULT_SIMULATIONS: usize = 1_000;

/// Penetration ratios (consumed / size) at which a buffer changes zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferZoneThresholds {
    /// Ratio at or above which a buffer is YELLOW.
    pub yellow: f64,
    /// Ratio at or above which a buffer is RED.
    pub red: f64,
}

impl Default for BufferZoneThresholds {
    fn default() -> Self {
        Self {
            yellow: 1.0 / 3.0,
            red: 2.0 / 3.0,
        }
    }
}

/// Configuration for a critical-chain analysis.
#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

/// Configuration for a Monte Carlo forecast.
#[derive(Clone, Debug)]
pub struct ForecastConfig {
    /// Number of trials; at least `MIN_SIMULATIONS`.
    pub simulations: usize,
    /// Seed for reproducible runs. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Run trials on the rayon pool. Results are identical either way.
    pub parallel: bool,
    /// Project start; enables the date fields of the result.
    pub start: Option<NaiveDateTime>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
            parallel: false,
            start: None,
            verbosity: 0,
        }
    }
}

impl ForecastConfig {
    pub fn with_simulations(simulations: usize) -> Self {
        Self {
            simulations,
            ..Self::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn in_parallel(mut self) -> Self {
        self.parallel = true;
        self
    }
}
