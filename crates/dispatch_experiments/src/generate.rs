//! Synthetic instance generation.
//!
//! Task attributes are drawn from the deadline with the same rules used when
//! processing raw task windows: expected time in `[0.4, 0.6]·deadline`,
//! workload in `[0.4, 2]·deadline`, reward in `[0, 1]` and a penalty rate
//! small enough that the reward never decays below zero before the deadline.

use dispatch_core::model::{Task, Worker};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// Derive a task's timing and reward attributes from its deadline.
///
/// `deadline` must be positive.
pub fn task_from_deadline<R: Rng + ?Sized>(
    id: u64,
    lat: f64,
    lon: f64,
    deadline: f64,
    rng: &mut R,
) -> Task {
    let expected_time = rng.gen_range(0.4 * deadline..=0.6 * deadline);
    let reward = rng.gen_range(0.0..=1.0);
    let workload = rng.gen_range(0.4 * deadline..=2.0 * deadline);
    let penalty_rate = rng.gen_range(0.0..=reward / (deadline - expected_time));
    Task::new(id, lat, lon)
        .with_deadline(deadline, expected_time)
        .with_workload(workload)
        .with_reward(reward, penalty_rate)
}

/// Ranges for synthetic instances. All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub lat_range: (f64, f64),
    pub lon_range: (f64, f64),
    pub velocity_range: (f64, f64),
    pub deadline_range: (f64, f64),
    /// Half the side of each worker's square service region.
    pub region_half_width: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            lat_range: (0.0, 1.0),
            lon_range: (0.0, 1.0),
            velocity_range: (0.05, 0.2),
            deadline_range: (2.0, 8.0),
            region_half_width: 0.3,
        }
    }
}

impl GeneratorSettings {
    /// Generate `num_workers` workers and `num_tasks` tasks from `seed`.
    ///
    /// Ids are row indices, as with instances loaded from CSV.
    pub fn generate(&self, num_workers: usize, num_tasks: usize, seed: u64) -> Instance {
        let mut rng = StdRng::seed_from_u64(seed);

        let workers = (0..num_workers as u64)
            .map(|id| {
                let lat = rng.gen_range(self.lat_range.0..=self.lat_range.1);
                let lon = rng.gen_range(self.lon_range.0..=self.lon_range.1);
                let velocity = rng.gen_range(self.velocity_range.0..=self.velocity_range.1);
                let half = self.region_half_width;
                Worker::new(id, lat, lon, velocity).with_region(
                    lat - half,
                    lon - half,
                    lat + half,
                    lon + half,
                )
            })
            .collect();

        let tasks = (0..num_tasks as u64)
            .map(|id| {
                let lat = rng.gen_range(self.lat_range.0..=self.lat_range.1);
                let lon = rng.gen_range(self.lon_range.0..=self.lon_range.1);
                let deadline = rng.gen_range(self.deadline_range.0..=self.deadline_range.1);
                task_from_deadline(id, lat, lon, deadline, &mut rng)
            })
            .collect();

        Instance { workers, tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_tasks_follow_the_processing_rules() {
        let mut rng = StdRng::seed_from_u64(1);
        for id in 0..500 {
            let deadline = 1.0 + id as f64 / 10.0;
            let task = task_from_deadline(id, 0.0, 0.0, deadline, &mut rng);

            assert!(task.validate().is_ok());
            assert!(task.expected_time >= 0.4 * deadline && task.expected_time <= 0.6 * deadline);
            assert!(task.workload >= 0.4 * deadline && task.workload <= 2.0 * deadline);
            assert!((0.0..=1.0).contains(&task.reward));
            // reward is still non-negative at the deadline
            assert!(task.reward - task.penalty_rate * (deadline - task.expected_time) >= -1e-12);
        }
    }

    #[test]
    fn generation_is_seeded() {
        let settings = GeneratorSettings::default();
        let first = settings.generate(20, 15, 9);
        assert_eq!(first, settings.generate(20, 15, 9));
        assert_ne!(first, settings.generate(20, 15, 10));
        assert_eq!((first.workers.len(), first.tasks.len()), (20, 15));
        assert!(first
            .workers
            .iter()
            .all(|w| w.validate().is_ok() && w.region_contains(w.lat, w.lon)));
    }
}
