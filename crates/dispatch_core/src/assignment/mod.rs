pub mod algorithm;
pub mod greedy;
pub mod milp;
pub mod types;

pub use algorithm::AssignmentSolver;
pub use greedy::{GreedySolver, TaskCommitment, TaskOrdering, WorkerPool};
pub use milp::{GoodLpBackend, MilpBackend, MilpSolver};
pub use types::{check_assignments, AssignmentViolation, SolveResult};
