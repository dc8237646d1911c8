use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Serialize;

use crate::model::{Assignment, Task, Worker};
use crate::spatial::is_available;

/// Outcome of one solve call.
///
/// A failed solve (budget exhausted, infeasible model, backend error) is the
/// sentinel `total_reward = -1`, `solved_count = -1` with no assignments.
/// Aggregations must skip it rather than add it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    pub total_reward: f64,
    pub solved_count: i64,
    pub elapsed: Duration,
    pub assignments: Vec<Assignment>,
}

impl SolveResult {
    /// Degenerate result for empty input.
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            total_reward: 0.0,
            solved_count: 0,
            elapsed,
            assignments: Vec::new(),
        }
    }

    /// The "no usable result" sentinel.
    pub fn failed(elapsed: Duration) -> Self {
        Self {
            total_reward: -1.0,
            solved_count: -1,
            elapsed,
            assignments: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.solved_count < 0
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// An invariant violated by a set of assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentViolation {
    UnknownWorker(u64),
    UnknownTask(u64),
    Unavailable { worker_id: u64, task_id: u64 },
    WorkerReused(u64),
}

/// Check the feasibility and capacity invariants of `assignments`.
///
/// Every pair must reference known records, satisfy `is_available`, and no
/// worker may appear twice. Returns all violations found.
pub fn check_assignments(
    workers: &[Worker],
    tasks: &[Task],
    assignments: &[Assignment],
) -> Vec<AssignmentViolation> {
    let workers_by_id: HashMap<u64, &Worker> = workers.iter().map(|w| (w.id, w)).collect();
    let tasks_by_id: HashMap<u64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut seen_workers = HashSet::new();
    let mut violations = Vec::new();

    for assignment in assignments {
        if !seen_workers.insert(assignment.worker_id) {
            violations.push(AssignmentViolation::WorkerReused(assignment.worker_id));
        }
        let Some(worker) = workers_by_id.get(&assignment.worker_id) else {
            violations.push(AssignmentViolation::UnknownWorker(assignment.worker_id));
            continue;
        };
        let Some(task) = tasks_by_id.get(&assignment.task_id) else {
            violations.push(AssignmentViolation::UnknownTask(assignment.task_id));
            continue;
        };
        if !is_available(worker, task) {
            violations.push(AssignmentViolation::Unavailable {
                worker_id: assignment.worker_id,
                task_id: assignment.task_id,
            });
        }
    }

    violations
}
