//! Parameter sweeps for the dispatch solvers.
//!
//! Runs solver configurations over synthetic or file-based instances in
//! parallel, summarizes the outcomes and exports them.
//!
//! # Quick Start
//!
//! ```no_run
//! use dispatch_core::scenario::SolverKind;
//! use dispatch_experiments::{export_to_csv, run_parallel_experiments, summarize, ExperimentSpace};
//!
//! let sets = ExperimentSpace::new()
//!     .sizes(vec![(100, 100), (200, 200)])
//!     .solvers(vec![SolverKind::Greedy, SolverKind::BatchMilp])
//!     .grid_dimensions(vec![2, 4])
//!     .repetitions(5)
//!     .generate();
//!
//! let results = run_parallel_experiments(&sets, None).unwrap();
//! let summaries = summarize(&results);
//! export_to_csv(&results, "results.csv").unwrap();
//! ```
//!
//! # Architecture
//!
//! - [`instance`]: processed CSV instances and raw-file conversion
//! - [`generate`]: seeded synthetic instances
//! - [`parameters`]: experiment grid
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: per-run results and summaries
//! - [`export`]: CSV and JSON output

pub mod export;
pub mod generate;
pub mod instance;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use export::{export_summary_to_csv, export_summary_to_json, export_to_csv, export_to_json};
pub use generate::GeneratorSettings;
pub use instance::Instance;
pub use metrics::{summarize, ExperimentResult, ExperimentSummary};
pub use parameters::{ExperimentSet, ExperimentSpace, InstanceSource};
pub use runner::{
    run_parallel_experiments, run_parallel_experiments_with_progress, run_single_experiment,
};
