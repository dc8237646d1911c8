use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::assignment::SolveResult;
use crate::model::{Task, Worker};

/// Unassigned workers and tasks carried into the next grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backlog {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
}

impl Backlog {
    /// Sample up to `capacity` workers and up to `capacity` tasks that the
    /// solve left unassigned. Sampling is without replacement.
    ///
    /// A failed solve has no assignments, so everything is a candidate.
    pub fn from_leftovers<R: Rng + ?Sized>(
        workers: &[Worker],
        tasks: &[Task],
        result: &SolveResult,
        capacity: usize,
        rng: &mut R,
    ) -> Self {
        let assigned_workers: HashSet<u64> =
            result.assignments.iter().map(|a| a.worker_id).collect();
        let assigned_tasks: HashSet<u64> =
            result.assignments.iter().map(|a| a.task_id).collect();

        let idle_workers: Vec<Worker> = workers
            .iter()
            .filter(|w| !assigned_workers.contains(&w.id))
            .copied()
            .collect();
        let open_tasks: Vec<Task> = tasks
            .iter()
            .filter(|t| !assigned_tasks.contains(&t.id))
            .copied()
            .collect();

        Self {
            workers: idle_workers.choose_multiple(rng, capacity).copied().collect(),
            tasks: open_tasks.choose_multiple(rng, capacity).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty() && self.tasks.is_empty()
    }
}
