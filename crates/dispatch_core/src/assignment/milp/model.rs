//! Mixed-integer formulation of the assignment problem.
//!
//! The model is built as plain data ([`LinearModel`]) so that constraint
//! construction does not depend on the solver library that eventually runs it.
//!
//! Variables, for every available worker/task pair `(i, j)`:
//!
//! - `A_ij` binary: worker `i` serves task `j`
//! - `h_ij` in `[0, deadline_j]`: equals `t_e[j]` when `A_ij = 1`, else 0
//!
//! and for every task `j`:
//!
//! - `t_e[j]` in `[0, deadline_j + 1]`: finish time
//! - `β_j` binary: at least one worker serves the task
//! - `δ_j` binary: 1 iff `t_e[j] >= deadline_j`
//! - `r_j` in `[0, reward_j]`: resolved reward
//!
//! Unavailable pairs get no variables at all, which fixes `A_ij = 0`.

use crate::config::MilpConfig;
use crate::model::{Task, Worker};
use crate::spatial::{is_available, worker_travel_time};

/// Index of a variable inside a [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Binary,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEq,
    GreaterEq,
    Equal,
}

/// `Σ coefficient * var  (sense)  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

/// A maximisation problem over bounded variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearModel {
    pub vars: Vec<VarDef>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: Vec<(VarId, f64)>,
}

impl LinearModel {
    pub fn add_var(&mut self, name: String, kind: VarKind, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.vars.len());
        let (lower, upper) = match kind {
            VarKind::Binary => (0.0, 1.0),
            VarKind::Continuous => (lower, upper),
        };
        self.vars.push(VarDef {
            name,
            kind,
            lower,
            upper,
        });
        id
    }

    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, sense: Sense, rhs: f64) {
        self.constraints.push(LinearConstraint { terms, sense, rhs });
    }

    pub fn binary_count(&self) -> usize {
        self.vars.iter().filter(|v| v.kind == VarKind::Binary).count()
    }
}

/// An `A_ij` variable and the pair it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairVar {
    pub worker_index: usize,
    pub task_index: usize,
    pub travel_time: f64,
    pub assign: VarId,
    pub link: VarId,
}

/// Where the interesting variables live, for reading a solution back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelLayout {
    pub pairs: Vec<PairVar>,
    pub rewards: Vec<VarId>,
    pub finish_times: Vec<VarId>,
    pub big_m: f64,
}

/// The formulation for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentModel {
    pub linear: LinearModel,
    pub layout: ModelLayout,
}

/// Big-M for an instance.
///
/// Dominates every quantity a disabled constraint has to absorb: finish times
/// (at most `deadline + 1`), penalised reward swings, workloads and travel
/// times.
pub fn derive_big_m(tasks: &[Task], max_travel_time: f64) -> f64 {
    let horizon = max_over(tasks, |t| t.deadline + 1.0);
    let penalty_swing = max_over(tasks, |t| t.penalty_rate * (t.deadline + 1.0));
    let reward = max_over(tasks, |t| t.reward);
    let workload = max_over(tasks, |t| t.workload);
    1.0 + horizon + penalty_swing + reward + workload + max_travel_time.max(0.0)
}

fn max_over(tasks: &[Task], f: impl Fn(&Task) -> f64) -> f64 {
    tasks.iter().map(f).fold(0.0, f64::max)
}

/// Build the formulation for `workers` and `tasks`.
pub fn build_model(workers: &[Worker], tasks: &[Task], config: &MilpConfig) -> AssignmentModel {
    let mut available: Vec<(usize, usize, f64)> = Vec::new();
    for (j, task) in tasks.iter().enumerate() {
        for (i, worker) in workers.iter().enumerate() {
            if is_available(worker, task) {
                available.push((i, j, worker_travel_time(worker, task)));
            }
        }
    }
    let max_travel = available.iter().map(|&(_, _, tt)| tt).fold(0.0, f64::max);
    let big_m = derive_big_m(tasks, max_travel);

    let mut model = LinearModel::default();
    let mut layout = ModelLayout {
        big_m,
        ..Default::default()
    };

    let mut task_vars = Vec::with_capacity(tasks.len());
    for (j, task) in tasks.iter().enumerate() {
        let reward = model.add_var(format!("r_{j}"), VarKind::Continuous, 0.0, task.reward);
        let finish = model.add_var(
            format!("t_e_{j}"),
            VarKind::Continuous,
            0.0,
            task.deadline + 1.0,
        );
        let served = model.add_var(format!("beta_{j}"), VarKind::Binary, 0.0, 1.0);
        let late = model.add_var(format!("delta_{j}"), VarKind::Binary, 0.0, 1.0);
        layout.rewards.push(reward);
        layout.finish_times.push(finish);
        model.objective.push((reward, 1.0));
        task_vars.push((finish, served, late));
    }

    let mut pairs_by_task: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut pairs_by_worker: Vec<Vec<usize>> = vec![Vec::new(); workers.len()];
    for (i, j, travel_time) in available {
        let assign = model.add_var(format!("A_{i}_{j}"), VarKind::Binary, 0.0, 1.0);
        let link = model.add_var(
            format!("h_{i}_{j}"),
            VarKind::Continuous,
            0.0,
            tasks[j].deadline,
        );
        pairs_by_task[j].push(layout.pairs.len());
        pairs_by_worker[i].push(layout.pairs.len());
        layout.pairs.push(PairVar {
            worker_index: i,
            task_index: j,
            travel_time,
            assign,
            link,
        });
    }

    // capacity: one task per worker
    for pair_indices in pairs_by_worker.iter().filter(|p| p.len() > 1) {
        let terms = pair_indices
            .iter()
            .map(|&p| (layout.pairs[p].assign, 1.0))
            .collect();
        model.add_constraint(terms, Sense::LessEq, 1.0);
    }

    // linking: h_ij = t_e[j] if A_ij = 1, h_ij = 0 otherwise
    for pair in &layout.pairs {
        let (finish, _, _) = task_vars[pair.task_index];
        model.add_constraint(
            vec![(pair.link, 1.0), (pair.assign, -big_m)],
            Sense::LessEq,
            0.0,
        );
        model.add_constraint(
            vec![(finish, 1.0), (pair.link, -1.0), (pair.assign, big_m)],
            Sense::LessEq,
            big_m,
        );
        model.add_constraint(
            vec![(pair.link, 1.0), (finish, -1.0), (pair.assign, big_m)],
            Sense::LessEq,
            big_m,
        );
    }

    for (j, task) in tasks.iter().enumerate() {
        let (finish, served, late) = task_vars[j];
        let reward = layout.rewards[j];
        let pairs = &pairs_by_task[j];
        let assigns: Vec<(VarId, f64)> = pairs
            .iter()
            .map(|&p| (layout.pairs[p].assign, 1.0))
            .collect();

        // β_j <= Σ A_ij <= n_j β_j
        let mut lower = vec![(served, 1.0)];
        lower.extend(assigns.iter().map(|&(a, _)| (a, -1.0)));
        model.add_constraint(lower, Sense::LessEq, 0.0);
        if !pairs.is_empty() {
            let mut upper = assigns.clone();
            upper.push((served, -(pairs.len() as f64)));
            model.add_constraint(upper, Sense::LessEq, 0.0);

            // Σ h_ij = Σ A_ij tt_ij + workload β_j
            let mut finish_link: Vec<(VarId, f64)> = pairs
                .iter()
                .flat_map(|&p| {
                    let pair = layout.pairs[p];
                    [(pair.link, 1.0), (pair.assign, -pair.travel_time)]
                })
                .collect();
            finish_link.push((served, -task.workload));
            model.add_constraint(finish_link, Sense::Equal, 0.0);
        }

        // unserved tasks finish after their deadline
        let horizon = task.deadline + 1.0;
        model.add_constraint(
            vec![(finish, 1.0), (served, horizon)],
            Sense::GreaterEq,
            horizon,
        );

        // δ_j = 0 iff t_e[j] < deadline_j
        model.add_constraint(
            vec![(finish, 1.0), (late, -task.deadline)],
            Sense::GreaterEq,
            0.0,
        );
        model.add_constraint(
            vec![(finish, 1.0), (late, -big_m)],
            Sense::LessEq,
            task.deadline - config.deadline_epsilon,
        );

        // r_j <= reward - penalty (t_e - expected) while on time, 0 when late
        model.add_constraint(
            vec![(reward, 1.0), (finish, task.penalty_rate), (late, -big_m)],
            Sense::LessEq,
            task.reward + task.penalty_rate * task.expected_time,
        );
        model.add_constraint(
            vec![(reward, 1.0), (late, task.reward)],
            Sense::LessEq,
            task.reward,
        );
    }

    AssignmentModel {
        linear: model,
        layout,
    }
}
