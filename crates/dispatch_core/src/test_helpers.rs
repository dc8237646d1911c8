//! Test helpers for common test setup and utilities.
//!
//! Shared fixtures for unit tests, integration tests and benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Task, Worker};

/// A unit-speed worker at `(lat, lon)` with an unbounded service region.
pub fn worker_at(id: u64, lat: f64, lon: f64) -> Worker {
    Worker::new(id, lat, lon, 1.0)
}

/// A task at `(lat, lon)` with the given reward and deadline.
///
/// Workload is 1, the expected time is half the deadline and the penalty
/// rate is a tenth of the reward.
pub fn task_at(id: u64, lat: f64, lon: f64, reward: f64, deadline: f64) -> Task {
    Task::new(id, lat, lon)
        .with_deadline(deadline, deadline / 2.0)
        .with_workload(1.0)
        .with_reward(reward, reward / 10.0)
}

/// Seeded random instance on the unit square.
///
/// Every worker's region covers the whole square, deadlines are large
/// enough that most pairs are reachable, and task ids start at 10_000 so
/// they never collide with worker ids in assertions.
pub fn random_instance(
    seed: u64,
    num_workers: usize,
    num_tasks: usize,
) -> (Vec<Worker>, Vec<Task>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let workers = (0..num_workers as u64)
        .map(|id| {
            Worker::new(id, rng.gen(), rng.gen(), rng.gen_range(0.5..2.0))
                .with_region(0.0, 0.0, 1.0, 1.0)
        })
        .collect();
    let tasks = (0..num_tasks as u64)
        .map(|i| {
            let deadline = rng.gen_range(2.0..6.0);
            let reward: f64 = rng.gen_range(0.1..1.0);
            Task::new(10_000 + i, rng.gen(), rng.gen())
                .with_deadline(deadline, deadline * rng.gen_range(0.4..0.6))
                .with_workload(rng.gen_range(0.2..1.5))
                .with_reward(reward, reward / (2.0 * deadline))
        })
        .collect();
    (workers, tasks)
}
