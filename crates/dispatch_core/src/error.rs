use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid worker {id}: {reason}")]
    InvalidWorker { id: u64, reason: String },

    #[error("Invalid task {id}: {reason}")]
    InvalidTask { id: u64, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Solver budget of {0:?} exhausted before an optimal solution was found")]
    SolveBudgetExceeded(Duration),

    #[error("All {0} solver slots are taken by running solves")]
    SolverBusy(usize),

    #[error("Model is infeasible or unbounded: {0}")]
    Infeasible(String),

    #[error("Solver backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
