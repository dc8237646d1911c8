//! Experiment grid: instance sizes × solver kinds × batching settings × repetitions.
//!
//! Every solver sees the same instance for a given size and repetition, so
//! rewards are directly comparable across solvers.

use std::path::PathBuf;

use dispatch_core::config::SolverConfig;
use dispatch_core::scenario::SolverKind;
use serde::Serialize;

use crate::generate::GeneratorSettings;
use crate::instance::Instance;

/// Where an experiment's instance comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InstanceSource {
    /// Generated from the run seed.
    Synthetic(GeneratorSettings),
    /// Processed CSV files, truncated to the requested size.
    Files { workers: PathBuf, tasks: PathBuf },
}

impl Default for InstanceSource {
    fn default() -> Self {
        InstanceSource::Synthetic(GeneratorSettings::default())
    }
}

/// A single experiment run.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSet {
    /// Identifies the configuration, shared by all repetitions.
    pub experiment_id: String,
    /// Repetition index within the experiment.
    pub run_id: usize,
    /// Instance generation and backlog sampling seed.
    pub seed: u64,
    pub solver: SolverKind,
    pub num_workers: usize,
    pub num_tasks: usize,
    pub config: SolverConfig,
    pub source: InstanceSource,
}

impl ExperimentSet {
    /// Build the instance for this run.
    pub fn instance(&self) -> Result<Instance, Box<dyn std::error::Error>> {
        match &self.source {
            InstanceSource::Synthetic(settings) => {
                Ok(settings.generate(self.num_workers, self.num_tasks, self.seed))
            }
            InstanceSource::Files { workers, tasks } => {
                Ok(Instance::load(workers, tasks)?.truncated(self.num_workers, self.num_tasks))
            }
        }
    }

    /// Solver configuration with the run seed applied to backlog sampling.
    pub fn solver_config(&self) -> SolverConfig {
        let mut config = self.config;
        config.batch.seed = self.seed;
        config
    }
}

fn is_batch(kind: SolverKind) -> bool {
    matches!(kind, SolverKind::BatchMilp | SolverKind::BatchBacklogMilp)
}

/// Defines the experiment grid.
#[derive(Debug, Clone)]
pub struct ExperimentSpace {
    base: SolverConfig,
    source: InstanceSource,
    sizes: Vec<(usize, usize)>,
    solvers: Vec<SolverKind>,
    grid_dimensions: Vec<usize>,
    backlog_sizes: Vec<usize>,
    repetitions: usize,
    base_seed: u64,
}

impl Default for ExperimentSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentSpace {
    pub fn new() -> Self {
        Self {
            base: SolverConfig::default(),
            source: InstanceSource::default(),
            sizes: vec![(100, 100)],
            solvers: vec![SolverKind::Greedy],
            grid_dimensions: vec![],
            backlog_sizes: vec![],
            repetitions: 1,
            base_seed: 0,
        }
    }

    /// Set `(num_workers, num_tasks)` pairs to explore.
    pub fn sizes(mut self, sizes: Vec<(usize, usize)>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn solvers(mut self, solvers: Vec<SolverKind>) -> Self {
        self.solvers = solvers;
        self
    }

    /// Grid dimensions for batch solvers. Empty means the base config's value.
    pub fn grid_dimensions(mut self, dimensions: Vec<usize>) -> Self {
        self.grid_dimensions = dimensions;
        self
    }

    /// Backlog sizes for the backlog solver. Empty means the base config's value.
    pub fn backlog_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.backlog_sizes = sizes;
        self
    }

    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn with_base(mut self, base: SolverConfig) -> Self {
        self.base = base;
        self
    }

    pub fn with_source(mut self, source: InstanceSource) -> Self {
        self.source = source;
        self
    }

    fn grid_values(&self, kind: SolverKind) -> Vec<usize> {
        if !is_batch(kind) || self.grid_dimensions.is_empty() {
            vec![self.base.batch.grid_dimension]
        } else {
            self.grid_dimensions.clone()
        }
    }

    fn backlog_values(&self, kind: SolverKind) -> Vec<Option<usize>> {
        match kind {
            SolverKind::BatchBacklogMilp if !self.backlog_sizes.is_empty() => {
                self.backlog_sizes.iter().copied().map(Some).collect()
            }
            SolverKind::BatchBacklogMilp => vec![self.base.batch.backlog_size],
            _ => vec![None],
        }
    }

    /// Generate every combination. Batching settings only multiply the
    /// solvers they apply to.
    pub fn generate(&self) -> Vec<ExperimentSet> {
        let mut sets = Vec::new();
        for &(num_workers, num_tasks) in &self.sizes {
            for &solver in &self.solvers {
                for grid_dimension in self.grid_values(solver) {
                    for backlog_size in self.backlog_values(solver) {
                        let mut config = self.base;
                        config.batch.grid_dimension = grid_dimension;
                        config.batch.backlog_size = backlog_size;

                        let mut experiment_id = format!("{solver}-{num_workers}x{num_tasks}");
                        if is_batch(solver) {
                            experiment_id.push_str(&format!("-g{grid_dimension}"));
                        }
                        if let Some(backlog) = backlog_size {
                            experiment_id.push_str(&format!("-b{backlog}"));
                        }

                        for run_id in 0..self.repetitions {
                            sets.push(ExperimentSet {
                                experiment_id: experiment_id.clone(),
                                run_id,
                                seed: self.base_seed.wrapping_add(run_id as u64),
                                solver,
                                num_workers,
                                num_tasks,
                                config,
                                source: self.source.clone(),
                            });
                        }
                    }
                }
            }
        }
        sets
    }
}
