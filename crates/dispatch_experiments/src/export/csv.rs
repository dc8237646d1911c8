use crate::metrics::{ExperimentResult, ExperimentSummary};

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn export_results_impl(
    results: &[ExperimentResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "solver",
        "num_workers",
        "num_tasks",
        "grid_dimension",
        "backlog_size",
        "total_reward",
        "solved_count",
        "assigned_workers",
        "elapsed_secs",
        "failed",
    ])?;

    for result in results {
        wtr.write_record([
            &result.experiment_id,
            &result.run_id.to_string(),
            &result.seed.to_string(),
            &result.solver.to_string(),
            &result.num_workers.to_string(),
            &result.num_tasks.to_string(),
            &result.grid_dimension.to_string(),
            &optional(result.backlog_size),
            &result.total_reward.to_string(),
            &result.solved_count.to_string(),
            &result.assigned_workers.to_string(),
            &result.elapsed_secs.to_string(),
            &result.failed.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_summaries_impl(
    summaries: &[ExperimentSummary],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "solver",
        "num_workers",
        "num_tasks",
        "runs",
        "failed_runs",
        "avg_reward",
        "avg_solved",
        "avg_elapsed_secs",
    ])?;

    for summary in summaries {
        wtr.write_record([
            &summary.experiment_id,
            &summary.solver.to_string(),
            &summary.num_workers.to_string(),
            &summary.num_tasks.to_string(),
            &summary.runs.to_string(),
            &summary.failed_runs.to_string(),
            &optional(summary.avg_reward),
            &optional(summary.avg_solved),
            &optional(summary.avg_elapsed_secs),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
