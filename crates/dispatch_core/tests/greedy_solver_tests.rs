mod support;

use dispatch_core::assignment::{AssignmentSolver, GreedySolver};
use dispatch_core::model::Task;
use dispatch_core::test_helpers::random_instance;
use support::instances::{assert_valid, deadline_miss, single_pair, split_pays_off};

#[test]
fn single_pair_earns_full_reward() {
    let (workers, tasks) = single_pair();
    let result = GreedySolver::default().solve(&workers, &tasks);

    assert_eq!(result.total_reward, 10.0);
    assert_eq!(result.solved_count, 1);
    assert_valid(&workers, &tasks, &result);
}

#[test]
fn missed_deadline_earns_nothing() {
    let (workers, tasks) = deadline_miss();
    let result = GreedySolver::default().solve(&workers, &tasks);

    assert_eq!(result.total_reward, 0.0);
    assert_eq!(result.solved_count, 0);
    assert!(result.assignments.is_empty());
}

#[test]
fn group_size_search_picks_the_split() {
    let (workers, tasks) = split_pays_off();
    let solver = GreedySolver::default();
    let result = solver.solve(&workers, &tasks);

    assert_eq!(result.total_reward, 10.0);
    assert_eq!(result.assignments.len(), 2);
    let commitments = solver.commitments(&workers, &tasks);
    assert_eq!(commitments[0].finish_time, 6.0);
}

#[test]
fn random_instances_respect_invariants() {
    for seed in 0..20 {
        let (workers, tasks) = random_instance(seed, 30, 20);
        for solver in [GreedySolver::by_reward(), GreedySolver::by_reward_per_workload()] {
            let result = solver.solve(&workers, &tasks);
            assert_valid(&workers, &tasks, &result);

            for commitment in solver.commitments(&workers, &tasks) {
                let task = tasks.iter().find(|t| t.id == commitment.task_id).unwrap();
                assert!(commitment.reward > 0.0 && commitment.reward <= task.reward);
                assert!(commitment.finish_time < task.deadline);
            }
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let (workers, tasks) = random_instance(11, 40, 25);
    let solver = GreedySolver::default();
    let first = solver.solve(&workers, &tasks);
    for _ in 0..5 {
        let again = solver.solve(&workers, &tasks);
        assert_eq!(again.total_reward, first.total_reward);
        assert_eq!(again.assignments, first.assignments);
    }
}

/// Raise the lowest reward without letting it overtake the next one, so the
/// visiting order is unchanged.
fn raise_lowest_reward(tasks: &[Task]) -> Vec<Task> {
    let mut rewards: Vec<f64> = tasks.iter().map(|t| t.reward).collect();
    rewards.sort_by(f64::total_cmp);
    let (lowest, next) = (rewards[0], rewards[1]);
    tasks
        .iter()
        .map(|task| {
            if task.reward == lowest {
                Task {
                    reward: (lowest + next) / 2.0,
                    ..*task
                }
            } else {
                *task
            }
        })
        .collect()
}

#[test]
fn raising_a_reward_never_lowers_the_total() {
    for seed in 0..20 {
        let (workers, tasks) = random_instance(seed, 15, 12);
        let solver = GreedySolver::default();
        let before = solver.solve(&workers, &tasks).total_reward;
        let after = solver.solve(&workers, &raise_lowest_reward(&tasks)).total_reward;
        assert!(after >= before, "seed {seed}: {after} < {before}");
    }

    let (workers, tasks) = split_pays_off();
    let richer = [Task {
        reward: 12.0,
        ..tasks[0]
    }];
    let solver = GreedySolver::default();
    assert!(
        solver.solve(&workers, &richer).total_reward >= solver.solve(&workers, &tasks).total_reward
    );
}
