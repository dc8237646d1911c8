//! Solver selection: map a [`SolverKind`] and a [`SolverConfig`] to a boxed
//! [`AssignmentSolver`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentSolver, GreedySolver, MilpSolver};
use crate::batching::BatchSolver;
use crate::config::SolverConfig;
use crate::error::{DispatchError, Result};

/// Type of assignment solver to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    Greedy,
    GreedyPerWorkload,
    Milp,
    BatchMilp,
    BatchBacklogMilp,
}

impl SolverKind {
    pub const ALL: [SolverKind; 5] = [
        SolverKind::Greedy,
        SolverKind::GreedyPerWorkload,
        SolverKind::Milp,
        SolverKind::BatchMilp,
        SolverKind::BatchBacklogMilp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Greedy => "greedy",
            SolverKind::GreedyPerWorkload => "greedy_per_workload",
            SolverKind::Milp => "milp",
            SolverKind::BatchMilp => "batch_milp",
            SolverKind::BatchBacklogMilp => "batch_backlog_milp",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        SolverKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DispatchError::InvalidConfig(format!("unknown solver kind: {s}")))
    }
}

/// Build a solver of the given kind.
///
/// `BatchBacklogMilp` uses `config.batch.backlog_size`, defaulting to a
/// backlog of 0 (the variant with no carry-over) when none is set;
/// `BatchMilp` ignores the backlog setting.
pub fn build_solver(kind: SolverKind, config: &SolverConfig) -> Result<Box<dyn AssignmentSolver>> {
    config.validate()?;
    let solver: Box<dyn AssignmentSolver> = match kind {
        SolverKind::Greedy => Box::new(GreedySolver::by_reward()),
        SolverKind::GreedyPerWorkload => Box::new(GreedySolver::by_reward_per_workload()),
        SolverKind::Milp => Box::new(MilpSolver::new(config.milp)),
        SolverKind::BatchMilp => {
            let mut batch = config.batch;
            batch.backlog_size = None;
            Box::new(BatchSolver::new(MilpSolver::new(config.milp), batch)?)
        }
        SolverKind::BatchBacklogMilp => {
            let mut batch = config.batch;
            batch.backlog_size = Some(batch.backlog_size.unwrap_or(0));
            Box::new(BatchSolver::new(MilpSolver::new(config.milp), batch)?)
        }
    };
    Ok(solver)
}
