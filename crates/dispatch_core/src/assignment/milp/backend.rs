//! Solver backends for [`LinearModel`]s.
//!
//! The default backend hands the model to `good_lp` on a dedicated thread and
//! waits at most the configured budget for an answer. `microlp` cannot be
//! interrupted, so a solve that outlives its budget keeps its thread until it
//! finishes. Those threads are capped by [`SolverSlots`]: when every slot is
//! taken a new solve fails at once instead of spawning another thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};

use crate::error::{DispatchError, Result};

use super::model::{LinearModel, Sense, VarKind};

/// Variable values of a solved model, indexed by [`super::model::VarId`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSolution {
    pub values: Vec<f64>,
}

impl ModelSolution {
    pub fn value(&self, id: super::model::VarId) -> f64 {
        self.values.get(id.0).copied().unwrap_or(0.0)
    }
}

/// Something that can solve a [`LinearModel`] within a time budget.
pub trait MilpBackend: Send + Sync {
    /// Solve `model` to optimality, or fail once `budget` has elapsed.
    fn solve(&self, model: LinearModel, budget: Duration) -> Result<ModelSolution>;
}

/// A fixed number of solver threads shared by all callers.
///
/// A slot is held until the solver thread exits, also after the caller has
/// stopped waiting for it.
#[derive(Debug)]
pub struct SolverSlots {
    busy: AtomicUsize,
    capacity: usize,
}

static GLOBAL_SLOTS: OnceLock<SolverSlots> = OnceLock::new();

impl SolverSlots {
    pub const fn new(capacity: usize) -> Self {
        Self {
            busy: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Process-wide slots, one per available core.
    pub fn global() -> &'static SolverSlots {
        GLOBAL_SLOTS.get_or_init(|| {
            let cores = thread::available_parallelism().map_or(1, |n| n.get());
            SolverSlots::new(cores)
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Solver threads currently running, abandoned ones included.
    pub fn in_use(&self) -> usize {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_free(&self) -> bool {
        self.in_use() < self.capacity
    }

    fn try_acquire(&'static self) -> Option<SlotGuard> {
        self.busy
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |busy| {
                (busy < self.capacity).then_some(busy + 1)
            })
            .ok()
            .map(|_| SlotGuard { slots: self })
    }
}

/// Releases its slot on drop, also when the job panics.
struct SlotGuard {
    slots: &'static SolverSlots,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slots.busy.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Run `job` on a thread from the global [`SolverSlots`] and wait at most
/// `budget` for it.
pub fn run_with_budget<T, F>(name: &str, budget: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    run_with_budget_on(SolverSlots::global(), name, budget, job)
}

/// Run `job` on its own thread, holding one of `slots`, and wait at most
/// `budget` for it.
///
/// Fails with [`DispatchError::SolverBusy`] without spawning when no slot is
/// free. When the budget runs out the thread finishes on its own, keeps its
/// slot until then, and its result is dropped. A panicking job is reported as
/// a backend error.
pub fn run_with_budget_on<T, F>(
    slots: &'static SolverSlots,
    name: &str,
    budget: Duration,
    job: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let slot = slots
        .try_acquire()
        .ok_or(DispatchError::SolverBusy(slots.capacity))?;

    let (tx, rx) = channel();
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(job));
            // free the slot before replying so a caller that solves again
            // right away finds it available
            drop(slot);
            let _ = tx.send(outcome);
        })
        .map_err(|error| {
            DispatchError::Backend(format!("failed to spawn solver thread: {error}"))
        })?;

    match rx.recv_timeout(budget) {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(DispatchError::Backend("solver thread panicked".to_string())),
        Err(RecvTimeoutError::Timeout) => Err(DispatchError::SolveBudgetExceeded(budget)),
        Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Backend(
            "solver thread exited without a result".to_string(),
        )),
    }
}

/// `good_lp` backend using the crate's default (pure Rust) solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl MilpBackend for GoodLpBackend {
    fn solve(&self, model: LinearModel, budget: Duration) -> Result<ModelSolution> {
        run_with_budget("milp-solve", budget, move || solve_blocking(&model))
    }
}

fn solve_blocking(model: &LinearModel) -> Result<ModelSolution> {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .vars
        .iter()
        .map(|def| match def.kind {
            VarKind::Binary => vars.add(variable().binary().name(def.name.clone())),
            VarKind::Continuous => vars.add(
                variable()
                    .min(def.lower)
                    .max(def.upper)
                    .name(def.name.clone()),
            ),
        })
        .collect();

    let objective = model
        .objective
        .iter()
        .fold(Expression::from(0.0), |acc, (id, coefficient)| {
            acc + *coefficient * handles[id.0]
        });

    let mut problem = vars.maximise(objective).using(default_solver);
    for constraint in &model.constraints {
        let lhs = constraint
            .terms
            .iter()
            .fold(Expression::from(0.0), |acc, (id, coefficient)| {
                acc + *coefficient * handles[id.0]
            });
        let row = match constraint.sense {
            Sense::LessEq => lhs.leq(constraint.rhs),
            Sense::GreaterEq => lhs.geq(constraint.rhs),
            Sense::Equal => good_lp::constraint::eq(lhs, constraint.rhs),
        };
        problem.add_constraint(row);
    }

    let solution = problem.solve().map_err(|error| match error {
        ResolutionError::Infeasible => DispatchError::Infeasible("infeasible".to_string()),
        ResolutionError::Unbounded => DispatchError::Infeasible("unbounded".to_string()),
        other => DispatchError::Backend(other.to_string()),
    })?;

    Ok(ModelSolution {
        values: handles.iter().map(|&h| solution.value(h)).collect(),
    })
}
