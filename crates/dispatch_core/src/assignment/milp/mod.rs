//! Optimal assignment through a mixed-integer linear program.
//!
//! [`build_model`] turns an instance into a solver-agnostic [`LinearModel`];
//! a [`MilpBackend`] solves it under a wall-clock budget; [`MilpSolver`] reads
//! rewards and assignments back out. Anything short of an optimal solution
//! within budget is reported as the failure sentinel.

pub mod backend;
pub mod model;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::MilpConfig;
use crate::error::Result;
use crate::model::{Assignment, Task, Worker};

use super::algorithm::AssignmentSolver;
use super::types::SolveResult;

pub use backend::{
    run_with_budget, run_with_budget_on, GoodLpBackend, MilpBackend, ModelSolution, SolverSlots,
};
pub use model::{build_model, derive_big_m, AssignmentModel, LinearModel, ModelLayout};

/// Binary values at or above this are read as 1.
const BINARY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct MilpSolver<B = GoodLpBackend> {
    config: MilpConfig,
    backend: B,
}

impl MilpSolver<GoodLpBackend> {
    pub fn new(config: MilpConfig) -> Self {
        Self {
            config,
            backend: GoodLpBackend,
        }
    }
}

impl<B: MilpBackend> MilpSolver<B> {
    pub fn with_backend(config: MilpConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &MilpConfig {
        &self.config
    }

    /// Solve and surface failures as errors instead of the sentinel.
    pub fn try_solve(&self, workers: &[Worker], tasks: &[Task]) -> Result<SolveResult> {
        let start = Instant::now();
        if workers.is_empty() || tasks.is_empty() {
            return Ok(SolveResult::empty(start.elapsed()));
        }

        let AssignmentModel { linear, layout } = build_model(workers, tasks, &self.config);
        if layout.pairs.is_empty() {
            debug!(workers = workers.len(), tasks = tasks.len(), "no feasible pairs");
            return Ok(SolveResult::empty(start.elapsed()));
        }
        debug!(
            vars = linear.vars.len(),
            binaries = linear.binary_count(),
            constraints = linear.constraints.len(),
            big_m = layout.big_m,
            "milp model built"
        );

        let solution = self.backend.solve(linear, self.config.time_limit())?;

        let rewards: Vec<f64> = layout
            .rewards
            .iter()
            .zip(tasks)
            .map(|(&var, task)| solution.value(var).clamp(0.0, task.reward))
            .collect();
        let solved: Vec<bool> = rewards
            .iter()
            .map(|&reward| reward > self.config.solved_epsilon)
            .collect();

        // workers parked on tasks that earn nothing are left unassigned
        let mut assignments: Vec<Assignment> = layout
            .pairs
            .iter()
            .filter(|pair| solution.value(pair.assign) >= BINARY_THRESHOLD)
            .filter(|pair| solved[pair.task_index])
            .map(|pair| Assignment::new(workers[pair.worker_index].id, tasks[pair.task_index].id))
            .collect();
        assignments.sort();

        let total_reward = rewards
            .iter()
            .zip(&solved)
            .filter(|(_, is_solved)| **is_solved)
            .map(|(reward, _)| *reward)
            .sum();

        Ok(SolveResult {
            total_reward,
            solved_count: solved.iter().filter(|&&s| s).count() as i64,
            elapsed: start.elapsed(),
            assignments,
        })
    }
}

impl<B: MilpBackend> AssignmentSolver for MilpSolver<B> {
    fn name(&self) -> &'static str {
        "milp"
    }

    fn solve(&self, workers: &[Worker], tasks: &[Task]) -> SolveResult {
        let start = Instant::now();
        match self.try_solve(workers, tasks) {
            Ok(result) => {
                info!(
                    workers = workers.len(),
                    tasks = tasks.len(),
                    reward = result.total_reward,
                    solved = result.solved_count,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "milp solved"
                );
                result
            }
            Err(error) => {
                warn!(
                    workers = workers.len(),
                    tasks = tasks.len(),
                    %error,
                    "milp solve failed"
                );
                SolveResult::failed(start.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assignment::milp::model::LinearModel;
    use crate::error::DispatchError;

    /// Backend that returns canned values without solving anything.
    struct FixedBackend(std::result::Result<Vec<f64>, ()>);

    impl MilpBackend for FixedBackend {
        fn solve(&self, _model: LinearModel, budget: Duration) -> Result<ModelSolution> {
            match &self.0 {
                Ok(values) => Ok(ModelSolution {
                    values: values.clone(),
                }),
                Err(()) => Err(DispatchError::SolveBudgetExceeded(budget)),
            }
        }
    }

    fn instance() -> (Vec<Worker>, Vec<Task>) {
        let workers = vec![Worker::new(0, 0.0, 0.0, 1.0), Worker::new(1, 1.0, 0.0, 1.0)];
        let tasks = vec![
            Task::new(10, 0.0, 0.0)
                .with_deadline(10.0, 5.0)
                .with_reward(4.0, 1.0),
            Task::new(11, 0.0, 0.0)
                .with_deadline(10.0, 5.0)
                .with_reward(2.0, 1.0),
        ];
        (workers, tasks)
    }

    #[test]
    fn backend_failure_becomes_sentinel() {
        let (workers, tasks) = instance();
        let solver = MilpSolver::with_backend(MilpConfig::default(), FixedBackend(Err(())));

        let result = solver.solve(&workers, &tasks);
        assert!(result.is_failure());
        assert_eq!(result.total_reward, -1.0);
        assert_eq!(result.solved_count, -1);
        assert!(result.assignments.is_empty());
        assert!(matches!(
            solver.try_solve(&workers, &tasks),
            Err(DispatchError::SolveBudgetExceeded(_))
        ));
    }

    #[test]
    fn rewards_below_epsilon_are_not_solved() {
        let (workers, tasks) = instance();
        let model = build_model(&workers, &tasks, &MilpConfig::default());
        let mut values = vec![0.0; model.linear.vars.len()];
        values[model.layout.rewards[0].0] = 4.0000001;
        values[model.layout.rewards[1].0] = 1e-9;
        // worker 0 -> task 10, worker 1 -> task 11
        for pair in &model.layout.pairs {
            if (pair.worker_index, pair.task_index) == (0, 0)
                || (pair.worker_index, pair.task_index) == (1, 1)
            {
                values[pair.assign.0] = 0.9999;
            }
        }

        let solver = MilpSolver::with_backend(MilpConfig::default(), FixedBackend(Ok(values)));
        let result = solver.solve(&workers, &tasks);
        assert_eq!(result.solved_count, 1);
        assert_eq!(result.total_reward, 4.0);
        assert_eq!(result.assignments, vec![Assignment::new(0, 10)]);
    }

    #[test]
    fn empty_and_infeasible_instances_skip_the_backend() {
        let (workers, tasks) = instance();
        let solver = MilpSolver::with_backend(MilpConfig::default(), FixedBackend(Err(())));

        assert_eq!(solver.solve(&[], &tasks).solved_count, 0);
        assert_eq!(solver.solve(&workers, &[]).total_reward, 0.0);

        let far_tasks = [Task::new(0, 100.0, 100.0).with_deadline(1.0, 0.5).with_reward(1.0, 0.0)];
        let result = solver.solve(&workers, &far_tasks);
        assert!(!result.is_failure());
        assert_eq!(result.total_reward, 0.0);
    }
}
