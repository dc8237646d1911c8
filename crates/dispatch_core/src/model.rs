//! Domain records: workers, tasks and the assignments produced by a solve.
//!
//! Records are plain immutable values. They are built once by the ingestion
//! layer and only read by the solvers.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// A mobile worker with a position, a reachable service rectangle and a speed.
///
/// The rectangle bounds the tasks the worker may serve. It does not have to
/// contain the worker's own position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    /// Distance units per time unit. Must be positive.
    pub velocity: f64,
}

impl Worker {
    /// Create a worker whose service region is unbounded.
    pub fn new(id: u64, lat: f64, lon: f64, velocity: f64) -> Self {
        Self {
            id,
            lat,
            lon,
            min_lat: f64::NEG_INFINITY,
            min_lon: f64::NEG_INFINITY,
            max_lat: f64::INFINITY,
            max_lon: f64::INFINITY,
            velocity,
        }
    }

    /// Restrict the service region to `[min_lat, max_lat] x [min_lon, max_lon]`.
    pub fn with_region(mut self, min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        self.min_lat = min_lat;
        self.min_lon = min_lon;
        self.max_lat = max_lat;
        self.max_lon = max_lon;
        self
    }

    /// Whether a point lies inside the service region (bounds inclusive).
    pub fn region_contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| DispatchError::InvalidWorker {
            id: self.id,
            reason: reason.to_string(),
        };
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !(self.velocity > 0.0) || !self.velocity.is_finite() {
            return Err(invalid("velocity must be positive and finite"));
        }
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(invalid("service region has min greater than max"));
        }
        Ok(())
    }
}

/// A point of work with a decaying reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    /// Time budget from now; the reward is zero at or after it.
    pub deadline: f64,
    /// Work shared by all workers assigned to the task once they arrive.
    pub workload: f64,
    /// Finishing at or before this time pays the full reward.
    pub expected_time: f64,
    /// Reward lost per time unit after `expected_time`.
    pub penalty_rate: f64,
    /// Maximum obtainable reward.
    pub reward: f64,
}

impl Task {
    pub fn new(id: u64, lat: f64, lon: f64) -> Self {
        Self {
            id,
            lat,
            lon,
            deadline: 1.0,
            workload: 0.0,
            expected_time: 0.5,
            penalty_rate: 0.0,
            reward: 0.0,
        }
    }

    pub fn with_deadline(mut self, deadline: f64, expected_time: f64) -> Self {
        self.deadline = deadline;
        self.expected_time = expected_time;
        self
    }

    pub fn with_workload(mut self, workload: f64) -> Self {
        self.workload = workload;
        self
    }

    pub fn with_reward(mut self, reward: f64, penalty_rate: f64) -> Self {
        self.reward = reward;
        self.penalty_rate = penalty_rate;
        self
    }

    /// Reward paid when the task completes at `finish_time`.
    ///
    /// Full reward up to `expected_time`, linear decay after it, and nothing
    /// at or past the deadline. Never negative.
    pub fn reward_at(&self, finish_time: f64) -> f64 {
        if finish_time >= self.deadline {
            0.0
        } else if finish_time <= self.expected_time {
            self.reward
        } else {
            (self.reward - self.penalty_rate * (finish_time - self.expected_time)).max(0.0)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| DispatchError::InvalidTask {
            id: self.id,
            reason: reason.to_string(),
        };
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !(self.deadline > 0.0) || !self.deadline.is_finite() {
            return Err(invalid("deadline must be positive and finite"));
        }
        if !(self.expected_time > 0.0 && self.expected_time < self.deadline) {
            return Err(invalid("expected_time must lie in (0, deadline)"));
        }
        if !(self.workload >= 0.0) {
            return Err(invalid("workload must be non-negative"));
        }
        if !(self.penalty_rate >= 0.0) {
            return Err(invalid("penalty_rate must be non-negative"));
        }
        if !(self.reward >= 0.0) || !self.reward.is_finite() {
            return Err(invalid("reward must be non-negative and finite"));
        }
        Ok(())
    }
}

/// One worker serving one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    pub worker_id: u64,
    pub task_id: u64,
}

impl Assignment {
    pub fn new(worker_id: u64, task_id: u64) -> Self {
        Self { worker_id, task_id }
    }
}
