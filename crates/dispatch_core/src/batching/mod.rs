//! Spatial batching: split a large instance into grid cells and solve each
//! cell on its own.
//!
//! Cells are visited row-major. Without a backlog the cells are independent
//! and may be solved in parallel. With a backlog, a random sample of each
//! cell's unassigned workers and tasks is carried into the next cell, which
//! recovers some of the reward lost at cell boundaries.

pub mod backlog;
pub mod grid;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assignment::{AssignmentSolver, MilpSolver, SolveResult};
use crate::config::{BatchConfig, SolverConfig};
use crate::error::Result;
use crate::model::{Task, Worker};

pub use backlog::Backlog;
pub use grid::{GridCell, SpatialGrid};

/// What happened in one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellReport {
    pub row: usize,
    pub col: usize,
    /// Records that belong to the cell itself.
    pub workers: usize,
    pub tasks: usize,
    /// Records carried in from earlier cells.
    pub backlog_workers: usize,
    pub backlog_tasks: usize,
    /// `None` when the cell had no workers or no tasks and was skipped.
    pub result: Option<SolveResult>,
}

/// Aggregated result of a batched solve plus the per-cell breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub result: SolveResult,
    pub cells: Vec<CellReport>,
    pub failed_cells: usize,
}

/// Runs an inner solver (the MILP solver by default) per grid cell.
#[derive(Debug, Clone)]
pub struct BatchSolver<S = MilpSolver> {
    inner: S,
    config: BatchConfig,
}

impl BatchSolver<MilpSolver> {
    /// MILP per cell, configured from `config`.
    pub fn milp(config: &SolverConfig) -> Result<Self> {
        Self::new(MilpSolver::new(config.milp), config.batch)
    }
}

impl<S: AssignmentSolver> BatchSolver<S> {
    pub fn new(inner: S, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Solve every cell and report per-cell results.
    pub fn solve_cells(&self, workers: &[Worker], tasks: &[Task]) -> BatchOutcome {
        let start = Instant::now();
        if workers.is_empty() || tasks.is_empty() {
            return BatchOutcome {
                result: SolveResult::empty(start.elapsed()),
                cells: Vec::new(),
                failed_cells: 0,
            };
        }

        let grid = match SpatialGrid::build(workers, tasks, self.config.grid_dimension) {
            Ok(grid) => grid,
            // grid_dimension was validated in `new`
            Err(error) => {
                warn!(%error, "grid construction failed");
                return BatchOutcome {
                    result: SolveResult::failed(start.elapsed()),
                    cells: Vec::new(),
                    failed_cells: 0,
                };
            }
        };

        let cells: Vec<CellReport> = match self.config.backlog_size {
            Some(capacity) => self.solve_with_backlog(grid, capacity),
            None if self.config.parallel => grid
                .into_cells()
                .into_par_iter()
                .map(|cell| self.solve_cell(cell))
                .collect(),
            None => grid
                .into_cells()
                .into_iter()
                .map(|cell| self.solve_cell(cell))
                .collect(),
        };

        let outcome = aggregate(cells, start);
        info!(
            solver = self.name(),
            grid = self.config.grid_dimension,
            reward = outcome.result.total_reward,
            solved = outcome.result.solved_count,
            failed_cells = outcome.failed_cells,
            elapsed_ms = outcome.result.elapsed.as_millis() as u64,
            "batch solved"
        );
        outcome
    }

    fn solve_cell(&self, cell: GridCell) -> CellReport {
        let result = cell
            .is_solvable()
            .then(|| self.inner.solve(&cell.workers, &cell.tasks));
        debug!(
            row = cell.row,
            col = cell.col,
            workers = cell.workers.len(),
            tasks = cell.tasks.len(),
            solved = result.as_ref().map(|r| r.solved_count),
            "cell done"
        );
        CellReport {
            row: cell.row,
            col: cell.col,
            workers: cell.workers.len(),
            tasks: cell.tasks.len(),
            backlog_workers: 0,
            backlog_tasks: 0,
            result,
        }
    }

    fn solve_with_backlog(&self, grid: SpatialGrid, capacity: usize) -> Vec<CellReport> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut backlog = Backlog::default();
        let mut reports = Vec::with_capacity(grid.cells().len());

        for cell in grid.into_cells() {
            let mut report = CellReport {
                row: cell.row,
                col: cell.col,
                workers: cell.workers.len(),
                tasks: cell.tasks.len(),
                backlog_workers: backlog.workers.len(),
                backlog_tasks: backlog.tasks.len(),
                result: None,
            };

            let mut workers = cell.workers;
            workers.extend_from_slice(&backlog.workers);
            let mut tasks = cell.tasks;
            tasks.extend_from_slice(&backlog.tasks);

            if workers.is_empty() || tasks.is_empty() {
                // nothing to solve; the incoming backlog moves on untouched
                reports.push(report);
                continue;
            }

            let result = self.inner.solve(&workers, &tasks);
            backlog = Backlog::from_leftovers(&workers, &tasks, &result, capacity, &mut rng);
            debug!(
                row = report.row,
                col = report.col,
                workers = workers.len(),
                tasks = tasks.len(),
                solved = result.solved_count,
                carried_workers = backlog.workers.len(),
                carried_tasks = backlog.tasks.len(),
                "cell done"
            );
            report.result = Some(result);
            reports.push(report);
        }

        reports
    }
}

fn aggregate(cells: Vec<CellReport>, start: Instant) -> BatchOutcome {
    let mut total_reward = 0.0;
    let mut solved_count = 0;
    let mut assignments = Vec::new();
    let mut failed_cells = 0;

    for report in &cells {
        match &report.result {
            Some(result) if result.is_failure() => {
                warn!(row = report.row, col = report.col, "cell solve failed, reward skipped");
                failed_cells += 1;
            }
            Some(result) => {
                total_reward += result.total_reward;
                solved_count += result.solved_count;
                assignments.extend_from_slice(&result.assignments);
            }
            None => {}
        }
    }

    BatchOutcome {
        result: SolveResult {
            total_reward,
            solved_count,
            elapsed: start.elapsed(),
            assignments,
        },
        cells,
        failed_cells,
    }
}

impl<S: AssignmentSolver> AssignmentSolver for BatchSolver<S> {
    fn name(&self) -> &'static str {
        if self.config.backlog_size.is_some() {
            "batch_backlog"
        } else {
            "batch"
        }
    }

    fn solve(&self, workers: &[Worker], tasks: &[Task]) -> SolveResult {
        self.solve_cells(workers, tasks).result
    }
}
