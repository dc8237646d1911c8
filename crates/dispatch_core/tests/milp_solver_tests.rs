mod support;

use std::time::Duration;

use dispatch_core::assignment::{AssignmentSolver, GreedySolver, MilpSolver};
use dispatch_core::batching::BatchSolver;
use dispatch_core::config::{BatchConfig, MilpConfig, SolverConfig};
use dispatch_core::model::Assignment;
use dispatch_core::test_helpers::random_instance;
use support::instances::{
    assert_task_rewards_bounded, assert_valid, deadline_miss, greedy_trap, single_pair,
    split_pays_off,
};

const TOLERANCE: f64 = 1e-4;

fn milp() -> MilpSolver {
    MilpSolver::new(MilpConfig::default().with_time_limit(Duration::from_secs(10)))
}

#[test]
fn single_pair_earns_full_reward() {
    let (workers, tasks) = single_pair();
    let result = milp().try_solve(&workers, &tasks).unwrap();

    assert!((result.total_reward - 10.0).abs() < TOLERANCE, "{result:?}");
    assert_eq!(result.solved_count, 1);
    assert_eq!(result.assignments, vec![Assignment::new(0, 0)]);
}

#[test]
fn missed_deadline_leaves_the_task_unsolved() {
    let (workers, tasks) = deadline_miss();
    let result = milp().try_solve(&workers, &tasks).unwrap();

    assert!(result.total_reward.abs() < TOLERANCE);
    assert_eq!(result.solved_count, 0);
    assert!(result.assignments.is_empty());
}

#[test]
fn both_workers_share_the_heavy_task() {
    let (workers, tasks) = split_pays_off();
    let result = milp().try_solve(&workers, &tasks).unwrap();

    assert!((result.total_reward - 10.0).abs() < TOLERANCE, "{result:?}");
    assert_eq!(result.assignments.len(), 2);
}

#[test]
fn milp_beats_greedy_where_greedy_is_myopic() {
    let (workers, tasks) = greedy_trap();
    let greedy = GreedySolver::default().solve(&workers, &tasks);
    let exact = milp().try_solve(&workers, &tasks).unwrap();

    assert_eq!(greedy.total_reward, 10.0);
    assert!((exact.total_reward - 18.0).abs() < TOLERANCE, "{exact:?}");
    assert_eq!(exact.solved_count, 2);
    assert_eq!(exact.assignments, vec![Assignment::new(0, 1), Assignment::new(1, 0)]);
    assert_valid(&workers, &tasks, &exact);
}

#[test]
fn small_random_instances_respect_invariants() {
    for seed in 0..3 {
        let (workers, tasks) = random_instance(seed, 3, 2);
        let result = milp().solve(&workers, &tasks);
        assert_valid(&workers, &tasks, &result);
    }
}

#[test]
fn each_served_task_earns_its_reward_curve() {
    for (workers, tasks) in [single_pair(), split_pays_off(), greedy_trap()] {
        let result = milp().try_solve(&workers, &tasks).unwrap();
        assert_task_rewards_bounded(&workers, &tasks, &result);
    }
    for seed in 0..3 {
        let (workers, tasks) = random_instance(seed, 3, 2);
        let result = milp().solve(&workers, &tasks);
        assert_valid(&workers, &tasks, &result);
        assert_task_rewards_bounded(&workers, &tasks, &result);
    }
}

#[test]
fn batched_milp_solves_each_cell() {
    let (workers, tasks) = single_pair();
    let config = SolverConfig {
        milp: MilpConfig::default().with_time_limit(Duration::from_secs(10)),
        batch: BatchConfig::new(2),
    };
    let outcome = BatchSolver::milp(&config).unwrap().solve_cells(&workers, &tasks);

    assert_eq!(outcome.failed_cells, 0);
    assert!((outcome.result.total_reward - 10.0).abs() < TOLERANCE);
    assert_eq!(outcome.cells.iter().filter(|c| c.result.is_some()).count(), 1);
}

#[test]
fn empty_input_is_not_a_failure() {
    let (workers, tasks) = single_pair();
    let result = milp().solve(&[], &tasks);
    assert_eq!((result.total_reward, result.solved_count), (0.0, 0));
    let result = milp().solve(&workers, &[]);
    assert!(!result.is_failure());
}
