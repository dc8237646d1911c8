//! Task assignment for spatial crowdsourcing.
//!
//! Workers with a position, a speed and a rectangular service region are
//! matched to tasks that carry a deadline, a workload and a reward that
//! decays past an expected completion time. Several workers may share a
//! task; each worker serves at most one. Three strategies are provided:
//! a greedy heuristic, an exact MILP, and grid batching around any inner
//! solver (optionally with a backlog carried between cells).

pub mod assignment;
pub mod batching;
pub mod config;
pub mod error;
pub mod model;
pub mod scenario;
pub mod spatial;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
