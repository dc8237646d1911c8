//! Task-priority greedy assignment.
//!
//! Tasks are visited once, highest priority first. For each task the solver
//! looks at the feasible unassigned workers closest-first and tries every
//! prefix of that list, keeping the group size with the highest reward.
//! Committed workers leave the pool for good; there is no backtracking.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Assignment, Task, Worker};
use crate::spatial::{finish_time, sorted_available_workers, worker_travel_time};

use super::algorithm::AssignmentSolver;
use super::types::SolveResult;

/// Order in which the greedy pass visits tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskOrdering {
    /// Highest maximum reward first.
    #[default]
    Reward,
    /// Highest reward per unit of workload first. Tasks without workload rank
    /// ahead of all others.
    RewardPerWorkload,
}

impl TaskOrdering {
    fn priority(&self, task: &Task) -> f64 {
        match self {
            TaskOrdering::Reward => task.reward,
            TaskOrdering::RewardPerWorkload => {
                if task.workload > 0.0 {
                    task.reward / task.workload
                } else if task.reward > 0.0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
        }
    }

    /// Tasks in visiting order. Stable: equal priorities keep input order.
    pub fn order<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by(|a, b| self.priority(b).total_cmp(&self.priority(a)));
        ordered
    }
}

/// Workers committed to one task by the greedy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCommitment {
    pub task_id: u64,
    pub worker_ids: Vec<u64>,
    pub finish_time: f64,
    pub reward: f64,
}

/// Unassigned workers, in input order.
///
/// Each task step consumes the pool and hands back what is left, so a pass is
/// a fold over tasks with no shared mutable set.
#[derive(Debug, Clone)]
pub struct WorkerPool<'a> {
    workers: Vec<&'a Worker>,
}

impl<'a> WorkerPool<'a> {
    pub fn new(workers: &'a [Worker]) -> Self {
        Self {
            workers: workers.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn worker_ids(&self) -> Vec<u64> {
        self.workers.iter().map(|w| w.id).collect()
    }

    /// Pick the best worker group for `task` and remove it from the pool.
    ///
    /// Returns the remaining pool and the commitment, if any group earns a
    /// positive reward. Only strict improvements replace the best group, so
    /// among equal rewards the smallest group wins.
    pub fn assign(mut self, task: &Task) -> (Self, Option<TaskCommitment>) {
        let candidates = sorted_available_workers(self.workers.iter().copied(), task);
        if candidates.is_empty() {
            return (self, None);
        }

        let mut best_reward = 0.0;
        let mut best_size = 0;
        let mut total_travel = 0.0;
        for (index, worker) in candidates.iter().enumerate() {
            let size = index + 1;
            total_travel += worker_travel_time(worker, task);
            let finish = (total_travel + task.workload) / size as f64;
            let reward = task.reward_at(finish);
            if reward > best_reward {
                best_reward = reward;
                best_size = size;
            }
        }

        if best_size == 0 {
            return (self, None);
        }

        let chosen = &candidates[..best_size];
        self.workers
            .retain(|worker| !chosen.iter().any(|c| std::ptr::eq(*c, *worker)));

        let commitment = TaskCommitment {
            task_id: task.id,
            worker_ids: chosen.iter().map(|w| w.id).collect(),
            finish_time: finish_time(chosen.iter().copied(), task),
            reward: best_reward,
        };
        (self, Some(commitment))
    }
}

/// Greedy solver: visit tasks by priority, give each the best closest-first
/// worker group still available.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver {
    pub ordering: TaskOrdering,
}

impl GreedySolver {
    pub fn new(ordering: TaskOrdering) -> Self {
        Self { ordering }
    }

    pub fn by_reward() -> Self {
        Self::new(TaskOrdering::Reward)
    }

    pub fn by_reward_per_workload() -> Self {
        Self::new(TaskOrdering::RewardPerWorkload)
    }

    /// Run the greedy pass and return every commitment in visiting order.
    pub fn commitments(&self, workers: &[Worker], tasks: &[Task]) -> Vec<TaskCommitment> {
        let mut pool = WorkerPool::new(workers);
        let mut commitments = Vec::new();

        for task in self.ordering.order(tasks) {
            if pool.is_empty() {
                break;
            }
            let (remaining, commitment) = pool.assign(task);
            pool = remaining;
            if let Some(commitment) = commitment {
                debug!(
                    task_id = commitment.task_id,
                    workers = commitment.worker_ids.len(),
                    reward = commitment.reward,
                    "greedy commit"
                );
                commitments.push(commitment);
            }
        }

        commitments
    }
}

impl AssignmentSolver for GreedySolver {
    fn name(&self) -> &'static str {
        match self.ordering {
            TaskOrdering::Reward => "greedy_by_reward",
            TaskOrdering::RewardPerWorkload => "greedy_by_reward_per_workload",
        }
    }

    fn solve(&self, workers: &[Worker], tasks: &[Task]) -> SolveResult {
        let start = Instant::now();
        if workers.is_empty() || tasks.is_empty() {
            return SolveResult::empty(start.elapsed());
        }

        let commitments = self.commitments(workers, tasks);
        let total_reward = commitments.iter().map(|c| c.reward).sum();
        let assignments = commitments
            .iter()
            .flat_map(|c| {
                c.worker_ids
                    .iter()
                    .map(move |&worker_id| Assignment::new(worker_id, c.task_id))
            })
            .collect();

        SolveResult {
            total_reward,
            solved_count: commitments.len() as i64,
            elapsed: start.elapsed(),
            assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: u64, lat: f64, lon: f64) -> Worker {
        Worker::new(id, lat, lon, 1.0).with_region(-100.0, -100.0, 100.0, 100.0)
    }

    fn task(id: u64, reward: f64) -> Task {
        Task::new(id, 0.0, 0.0)
            .with_deadline(20.0, 5.0)
            .with_workload(2.0)
            .with_reward(reward, 1.0)
    }

    #[test]
    fn single_worker_finishing_before_expected_time_earns_full_reward() {
        let workers = [Worker::new(0, 0.0, 0.0, 1.0).with_region(-1.0, -1.0, 1.0, 1.0)];
        let tasks = [Task::new(0, 0.0, 0.0)
            .with_deadline(10.0, 5.0)
            .with_workload(2.0)
            .with_reward(10.0, 1.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.total_reward, 10.0);
        assert_eq!(result.solved_count, 1);
        assert_eq!(result.assignments, vec![Assignment::new(0, 0)]);
    }

    #[test]
    fn missed_deadline_leaves_task_unsolved() {
        let workers = [Worker::new(0, 0.0, 0.0, 1.0).with_region(-1.0, -1.0, 1.0, 1.0)];
        let tasks = [Task::new(0, 0.0, 0.0)
            .with_deadline(1.0, 0.5)
            .with_workload(2.0)
            .with_reward(10.0, 1.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.total_reward, 0.0);
        assert_eq!(result.solved_count, 0);
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn splitting_heavy_workload_beats_single_worker() {
        // k=1: (1 + 10) / 1 = 11 -> 10 - 6 = 4; k=2: (1 + 1 + 10) / 2 = 6 -> 9
        let workers = [worker(0, 1.0, 0.0), worker(1, -1.0, 0.0)];
        let tasks = [task(0, 10.0).with_workload(10.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.total_reward, 9.0);
        assert_eq!(result.assignments.len(), 2);
    }

    #[test]
    fn far_second_worker_is_not_added() {
        // k=1: (1 + 10) = 11 -> 4; k=2: (1 + 19 + 10) / 2 = 15 -> 0
        let workers = [worker(0, 1.0, 0.0), worker(1, 19.0, 0.0)];
        let tasks = [task(0, 10.0).with_workload(10.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.total_reward, 4.0);
        assert_eq!(result.assignments, vec![Assignment::new(0, 0)]);
    }

    #[test]
    fn equal_rewards_keep_the_smallest_group() {
        let workers = [worker(0, 0.0, 0.0), worker(1, 0.0, 0.0)];
        let tasks = [task(0, 10.0).with_workload(0.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.assignments, vec![Assignment::new(0, 0)]);
    }

    #[test]
    fn higher_reward_task_claims_the_contested_worker() {
        let workers = [worker(0, 0.0, 0.0)];
        let tasks = [task(0, 3.0), task(1, 7.0)];

        let result = GreedySolver::by_reward().solve(&workers, &tasks);
        assert_eq!(result.total_reward, 7.0);
        assert_eq!(result.assignments, vec![Assignment::new(0, 1)]);
    }

    #[test]
    fn reward_per_workload_ordering_prefers_light_tasks() {
        let workers = [worker(0, 0.0, 0.0)];
        let tasks = [
            task(0, 8.0).with_workload(4.0),
            task(1, 5.0).with_workload(1.0),
        ];

        let result = GreedySolver::by_reward_per_workload().solve(&workers, &tasks);
        assert_eq!(result.assignments, vec![Assignment::new(0, 1)]);
        assert_eq!(result.total_reward, 5.0);
    }

    #[test]
    fn pool_shrinks_by_committed_workers() {
        let workers = [worker(0, 0.0, 0.0), worker(1, 1.0, 0.0), worker(2, 2.0, 0.0)];
        let pool = WorkerPool::new(&workers);
        let (pool, commitment) = pool.assign(&task(0, 10.0));

        let commitment = commitment.expect("task should be served");
        assert_eq!(commitment.worker_ids, vec![0]);
        assert_eq!(commitment.finish_time, 2.0);
        assert_eq!(pool.worker_ids(), vec![1, 2]);
    }

    #[test]
    fn empty_input_is_a_zero_result() {
        let result = GreedySolver::default().solve(&[], &[task(0, 1.0)]);
        assert_eq!(result.total_reward, 0.0);
        assert_eq!(result.solved_count, 0);
        assert!(!result.is_failure());
    }
}
