use crate::model::{Task, Worker};

use super::types::SolveResult;

/// Trait for solvers that assign workers to tasks.
///
/// Each worker serves at most one task; a task may receive several workers who
/// share its workload. Implementations hold no state between calls, so one
/// instance can solve disjoint instances from several threads at once.
///
/// # Examples
///
/// ```rust
/// use dispatch_core::assignment::{AssignmentSolver, GreedySolver};
/// use dispatch_core::model::{Task, Worker};
///
/// let workers = [Worker::new(0, 0.0, 0.0, 1.0).with_region(-1.0, -1.0, 1.0, 1.0)];
/// let tasks = [Task::new(0, 0.0, 0.0)
///     .with_deadline(10.0, 5.0)
///     .with_workload(2.0)
///     .with_reward(10.0, 1.0)];
///
/// let result = GreedySolver::default().solve(&workers, &tasks);
/// assert_eq!(result.total_reward, 10.0);
/// assert_eq!(result.solved_count, 1);
/// ```
pub trait AssignmentSolver: Send + Sync {
    /// Short stable name used in logs and exported results.
    fn name(&self) -> &'static str;

    /// Assign `workers` to `tasks`, maximising total reward.
    ///
    /// Empty input yields a zero result. Solvers that can fail (for example
    /// under a time budget) return [`SolveResult::failed`] instead of a
    /// partial answer.
    fn solve(&self, workers: &[Worker], tasks: &[Task]) -> SolveResult;
}

impl<S: AssignmentSolver + ?Sized> AssignmentSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, workers: &[Worker], tasks: &[Task]) -> SolveResult {
        (**self).solve(workers, tasks)
    }
}
