//! Result export to CSV and JSON.

use std::path::Path;

use crate::metrics::{ExperimentResult, ExperimentSummary};

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export per-run results to CSV, one row per run.
///
/// # Errors
///
/// Returns an error if `results` is empty or if file creation or CSV
/// writing fails.
pub fn export_to_csv(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_results_impl(results, file)
}

/// Export experiment summaries to CSV, one row per experiment id.
pub fn export_summary_to_csv(
    summaries: &[ExperimentSummary],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(summaries)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_summaries_impl(summaries, file)
}

/// Export per-run results as a pretty-printed JSON array.
pub fn export_to_json(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Export experiment summaries as a pretty-printed JSON array.
pub fn export_summary_to_json(
    summaries: &[ExperimentSummary],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(summaries, file)
}
