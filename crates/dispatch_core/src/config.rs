//! Solver configuration.
//!
//! Plain serde structs with defaults; an experiment driver may load them from
//! JSON and override individual fields.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Default wall-clock budget for one MILP solve, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 3.0;

/// Strict-inequality margin used by the deadline indicator.
pub const DEFAULT_DEADLINE_EPSILON: f64 = 1e-3;

/// Rewards at or below this value do not count as solved tasks.
pub const DEFAULT_SOLVED_EPSILON: f64 = 1e-6;

/// Settings for the MILP solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilpConfig {
    /// Wall-clock budget for a single model solve.
    pub time_limit_secs: f64,
    /// `t_e < deadline` is encoded as `t_e <= deadline - deadline_epsilon`.
    pub deadline_epsilon: f64,
    /// Minimum resolved reward for a task to count as solved.
    pub solved_epsilon: f64,
}

impl Default for MilpConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            deadline_epsilon: DEFAULT_DEADLINE_EPSILON,
            solved_epsilon: DEFAULT_SOLVED_EPSILON,
        }
    }
}

impl MilpConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = limit.as_secs_f64();
        self
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_secs.max(0.0))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_limit_secs > 0.0) || !self.time_limit_secs.is_finite() {
            return Err(DispatchError::InvalidConfig(
                "time_limit_secs must be positive and finite".to_string(),
            ));
        }
        if !(self.deadline_epsilon > 0.0) {
            return Err(DispatchError::InvalidConfig(
                "deadline_epsilon must be positive".to_string(),
            ));
        }
        if !(self.solved_epsilon >= 0.0) {
            return Err(DispatchError::InvalidConfig(
                "solved_epsilon must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Spatial batching: an `n x n` grid, optionally with backlog carry-over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Cells per axis. Must be at least 1.
    pub grid_dimension: usize,
    /// Maximum unassigned workers (and, separately, tasks) carried into the
    /// next cell. `None` disables the backlog.
    pub backlog_size: Option<usize>,
    /// Seed for backlog sampling (for reproducibility).
    pub seed: u64,
    /// Solve independent cells on the rayon pool. Ignored with a backlog,
    /// which is sequential by construction.
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            grid_dimension: 2,
            backlog_size: None,
            seed: 0,
            parallel: false,
        }
    }
}

impl BatchConfig {
    pub fn new(grid_dimension: usize) -> Self {
        Self {
            grid_dimension,
            ..Default::default()
        }
    }

    pub fn with_backlog(mut self, backlog_size: usize) -> Self {
        self.backlog_size = Some(backlog_size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_dimension == 0 {
            return Err(DispatchError::InvalidConfig(
                "grid_dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combined configuration used by the solver factory.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub milp: MilpConfig,
    pub batch: BatchConfig,
}

impl SolverConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.milp.validate()?;
        self.batch.validate()
    }
}
