#![allow(dead_code)]

use dispatch_core::assignment::{check_assignments, SolveResult};
use dispatch_core::model::{Task, Worker};
use dispatch_core::spatial::finish_time;

/// One worker and one task at the origin: finishes at 2, pays the full 10.
pub fn single_pair() -> (Vec<Worker>, Vec<Task>) {
    let workers = vec![Worker::new(0, 0.0, 0.0, 1.0).with_region(-1.0, -1.0, 1.0, 1.0)];
    let tasks = vec![Task::new(0, 0.0, 0.0)
        .with_deadline(10.0, 5.0)
        .with_workload(2.0)
        .with_reward(10.0, 1.0)];
    (workers, tasks)
}

/// Same worker, but the workload cannot be finished before the deadline.
pub fn deadline_miss() -> (Vec<Worker>, Vec<Task>) {
    let (workers, _) = single_pair();
    let tasks = vec![Task::new(0, 0.0, 0.0)
        .with_deadline(1.0, 0.5)
        .with_workload(2.0)
        .with_reward(10.0, 1.0)];
    (workers, tasks)
}

/// Two workers one unit away on either side of a heavy task. Alone, a worker
/// finishes at 11 (reward 5); together they finish at 6 (reward 10).
pub fn split_pays_off() -> (Vec<Worker>, Vec<Task>) {
    let workers = vec![Worker::new(0, 1.0, 0.0, 1.0), Worker::new(1, -1.0, 0.0, 1.0)];
    let tasks = vec![Task::new(0, 0.0, 0.0)
        .with_deadline(20.0, 6.0)
        .with_workload(10.0)
        .with_reward(10.0, 1.0)];
    (workers, tasks)
}

/// Greedy hands the only worker that can reach task 1 to the higher-paying
/// task 0 and earns 10; sending worker 1 to task 0 instead earns 18.
pub fn greedy_trap() -> (Vec<Worker>, Vec<Task>) {
    let workers = vec![Worker::new(0, 0.5, 0.0, 1.0), Worker::new(1, -3.0, 0.0, 1.0)];
    let tasks = vec![
        Task::new(0, 0.0, 0.0)
            .with_deadline(5.0, 4.0)
            .with_workload(0.5)
            .with_reward(10.0, 1.0),
        Task::new(1, 2.0, 0.0)
            .with_deadline(3.0, 2.5)
            .with_workload(0.5)
            .with_reward(8.0, 1.0),
    ];
    (workers, tasks)
}

/// Assert the feasibility and capacity invariants and that the result is
/// not the failure sentinel.
pub fn assert_valid(workers: &[Worker], tasks: &[Task], result: &SolveResult) {
    assert!(!result.is_failure(), "solve failed: {result:?}");
    let violations = check_assignments(workers, tasks, &result.assignments);
    assert!(violations.is_empty(), "violations: {violations:?}");
    let max_reward: f64 = tasks.iter().map(|t| t.reward).sum();
    assert!(result.total_reward >= 0.0 && result.total_reward <= max_reward + 1e-6);
    assert!(result.solved_count as usize <= tasks.len());
}

/// Rebuild every served task's reward from the assigned workers, check that
/// it lies in `[0, task.reward]`, and that the rebuilt rewards add up to the
/// reported total.
pub fn assert_task_rewards_bounded(workers: &[Worker], tasks: &[Task], result: &SolveResult) {
    let mut rebuilt_total = 0.0;
    for task in tasks {
        let team: Vec<&Worker> = result
            .assignments
            .iter()
            .filter(|a| a.task_id == task.id)
            .filter_map(|a| workers.iter().find(|w| w.id == a.worker_id))
            .collect();
        if team.is_empty() {
            continue;
        }
        let reward = task.reward_at(finish_time(team.iter().copied(), task));
        assert!(
            (0.0..=task.reward).contains(&reward),
            "task {} earns {reward} of at most {}",
            task.id,
            task.reward
        );
        rebuilt_total += reward;
    }
    assert!(
        (rebuilt_total - result.total_reward).abs() < 1e-3,
        "rebuilt {rebuilt_total}, reported {}",
        result.total_reward
    );
}
