//! Per-run metrics and their aggregation.
//!
//! Failed runs keep their `-1` sentinels in [`ExperimentResult`] but are
//! excluded from every average in [`summarize`]; they are counted instead.

use std::collections::HashMap;

use dispatch_core::assignment::SolveResult;
use dispatch_core::scenario::SolverKind;
use serde::Serialize;

use crate::parameters::ExperimentSet;

/// Outcome of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub solver: SolverKind,
    pub num_workers: usize,
    pub num_tasks: usize,
    pub grid_dimension: usize,
    pub backlog_size: Option<usize>,
    /// `-1.0` when the run failed.
    pub total_reward: f64,
    /// `-1` when the run failed.
    pub solved_count: i64,
    pub assigned_workers: usize,
    pub elapsed_secs: f64,
    pub failed: bool,
}

impl ExperimentResult {
    pub fn from_solve(set: &ExperimentSet, result: &SolveResult) -> Self {
        Self {
            experiment_id: set.experiment_id.clone(),
            run_id: set.run_id,
            seed: set.seed,
            solver: set.solver,
            num_workers: set.num_workers,
            num_tasks: set.num_tasks,
            grid_dimension: set.config.batch.grid_dimension,
            backlog_size: set.config.batch.backlog_size,
            total_reward: result.total_reward,
            solved_count: result.solved_count,
            assigned_workers: result.assignments.len(),
            elapsed_secs: result.elapsed_secs(),
            failed: result.is_failure(),
        }
    }

    /// A run that never reached the solver (bad instance, bad config).
    pub fn failed(set: &ExperimentSet) -> Self {
        Self::from_solve(set, &SolveResult::failed(std::time::Duration::ZERO))
    }
}

/// Averages over the successful runs of one experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub experiment_id: String,
    pub solver: SolverKind,
    pub num_workers: usize,
    pub num_tasks: usize,
    pub runs: usize,
    pub failed_runs: usize,
    /// `None` when every run failed.
    pub avg_reward: Option<f64>,
    pub avg_solved: Option<f64>,
    pub avg_elapsed_secs: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Group results by experiment id, in order of first appearance.
pub fn summarize(results: &[ExperimentResult]) -> Vec<ExperimentSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ExperimentResult>> = HashMap::new();
    for result in results {
        let group = groups.entry(result.experiment_id.as_str()).or_default();
        if group.is_empty() {
            order.push(result.experiment_id.as_str());
        }
        group.push(result);
    }

    order
        .into_iter()
        .filter_map(|id| {
            let group = groups.get(id)?;
            let first = group.first()?;
            let ok: Vec<&&ExperimentResult> = group.iter().filter(|r| !r.failed).collect();
            let rewards: Vec<f64> = ok.iter().map(|r| r.total_reward).collect();
            let solved: Vec<f64> = ok.iter().map(|r| r.solved_count as f64).collect();
            let elapsed: Vec<f64> = ok.iter().map(|r| r.elapsed_secs).collect();

            Some(ExperimentSummary {
                experiment_id: id.to_string(),
                solver: first.solver,
                num_workers: first.num_workers,
                num_tasks: first.num_tasks,
                runs: group.len(),
                failed_runs: group.len() - ok.len(),
                avg_reward: mean(&rewards),
                avg_solved: mean(&solved),
                avg_elapsed_secs: mean(&elapsed),
            })
        })
        .collect()
}
