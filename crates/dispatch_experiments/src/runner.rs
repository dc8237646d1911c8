//! Parallel experiment execution using rayon.
//!
//! Experiment runs are independent: each builds its own instance and solver.
//! Batch solvers solve their cells sequentially inside a run.

use dispatch_core::assignment::check_assignments;
use dispatch_core::scenario::build_solver;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::metrics::ExperimentResult;
use crate::parameters::ExperimentSet;

/// Run one experiment: build the instance and the solver, then solve.
pub fn run_single_experiment(
    set: &ExperimentSet,
) -> Result<ExperimentResult, Box<dyn std::error::Error>> {
    let instance = set.instance()?;
    let mut config = set.solver_config();
    config.batch.parallel = false;
    let solver = build_solver(set.solver, &config)?;

    let result = solver.solve(&instance.workers, &instance.tasks);
    if cfg!(debug_assertions) {
        let violations = check_assignments(&instance.workers, &instance.tasks, &result.assignments);
        if !violations.is_empty() {
            warn!(experiment = %set.experiment_id, ?violations, "assignment invariants violated");
        }
    }
    debug!(
        experiment = %set.experiment_id,
        run = set.run_id,
        solver = solver.name(),
        reward = result.total_reward,
        solved = result.solved_count,
        "experiment run finished"
    );
    Ok(ExperimentResult::from_solve(set, &result))
}

/// Run many experiments in parallel with a progress bar.
///
/// Results are in the same order as `experiment_sets`.
pub fn run_parallel_experiments(
    experiment_sets: &[ExperimentSet],
    num_threads: Option<usize>,
) -> Result<Vec<ExperimentResult>, rayon::ThreadPoolBuildError> {
    run_parallel_experiments_with_progress(experiment_sets, num_threads, true)
}

/// Run many experiments in parallel with an optional progress bar.
///
/// A run that cannot start (unreadable instance, invalid configuration) is
/// logged and recorded as failed.
pub fn run_parallel_experiments_with_progress(
    experiment_sets: &[ExperimentSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ExperimentResult>, rayon::ThreadPoolBuildError> {
    let total = experiment_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let results = pool.install(|| {
        experiment_sets
            .par_iter()
            .map(|set| {
                let result = run_single_experiment(set).unwrap_or_else(|error| {
                    warn!(
                        experiment = %set.experiment_id,
                        run = set.run_id,
                        %error,
                        "experiment run failed"
                    );
                    ExperimentResult::failed(set)
                });
                if let Some(ref progress_bar) = pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{ExperimentSpace, InstanceSource};
    use dispatch_core::scenario::SolverKind;

    #[test]
    fn single_experiment_runs() {
        let sets = ExperimentSpace::new().sizes(vec![(20, 15)]).generate();
        let result = run_single_experiment(&sets[0]).unwrap();

        assert!(!result.failed);
        assert!(result.total_reward >= 0.0);
        assert_eq!((result.num_workers, result.num_tasks), (20, 15));
    }

    #[test]
    fn parallel_results_keep_input_order() {
        let sets = ExperimentSpace::new()
            .sizes(vec![(10, 10), (30, 20)])
            .solvers(vec![SolverKind::Greedy, SolverKind::GreedyPerWorkload])
            .repetitions(2)
            .generate();
        let results = run_parallel_experiments_with_progress(&sets, Some(2), false).unwrap();

        assert_eq!(results.len(), 8);
        for (set, result) in sets.iter().zip(&results) {
            assert_eq!((&set.experiment_id, set.run_id), (&result.experiment_id, result.run_id));
        }
    }

    #[test]
    fn missing_instance_files_are_recorded_as_failures() {
        let sets = ExperimentSpace::new()
            .with_source(InstanceSource::Files {
                workers: "/nonexistent/workers.csv".into(),
                tasks: "/nonexistent/tasks.csv".into(),
            })
            .generate();
        let results = run_parallel_experiments_with_progress(&sets, Some(1), false).unwrap();

        assert!(results[0].failed);
        assert_eq!(results[0].total_reward, -1.0);
    }
}
