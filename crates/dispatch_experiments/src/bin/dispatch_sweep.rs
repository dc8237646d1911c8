use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dispatch_core::config::SolverConfig;
use dispatch_core::scenario::SolverKind;
use dispatch_experiments::instance::{process_raw_tasks, process_raw_workers};
use dispatch_experiments::{
    export_summary_to_csv, export_summary_to_json, export_to_csv, export_to_json,
    run_parallel_experiments_with_progress,
    summarize, ExperimentSpace, GeneratorSettings, InstanceSource,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dispatch_sweep",
    about = "Run and export spatial crowdsourcing assignment experiments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a parameter sweep and export per-run results and summaries
    Sweep(SweepArgs),
    /// Write a synthetic instance as processed CSV files
    Generate {
        #[arg(long, default_value_t = 100)]
        workers: usize,
        #[arg(long, default_value_t = 100)]
        tasks: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value = "workers0.csv")]
        workers_out: PathBuf,
        #[arg(long, default_value = "tasks0.csv")]
        tasks_out: PathBuf,
    },
    /// Convert raw `;` separated worker and task files into processed CSV files
    ProcessRaw {
        #[arg(long)]
        raw_workers: PathBuf,
        #[arg(long)]
        raw_tasks: PathBuf,
        #[arg(long)]
        workers_out: PathBuf,
        #[arg(long)]
        tasks_out: PathBuf,
        /// Seed for the derived task attributes
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(clap::Args)]
struct SweepArgs {
    /// Instance sizes as `WORKERSxTASKS`
    #[arg(long, value_delimiter = ',', default_value = "100x100", value_parser = parse_size)]
    sizes: Vec<(usize, usize)>,
    /// Solvers to compare
    #[arg(long, value_delimiter = ',', default_value = "greedy,greedy_per_workload")]
    solvers: Vec<SolverKind>,
    /// Grid dimensions for the batch solvers
    #[arg(long, value_delimiter = ',')]
    grid: Vec<usize>,
    /// Backlog sizes for the backlog solver
    #[arg(long, value_delimiter = ',')]
    backlog: Vec<usize>,
    #[arg(long, default_value_t = 1)]
    repetitions: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Solver configuration as JSON
    #[arg(long, env = "DISPATCH_SOLVER_CONFIG")]
    config: Option<PathBuf>,
    /// Processed worker CSV; synthetic instances are used when absent
    #[arg(long, requires = "tasks_csv")]
    workers_csv: Option<PathBuf>,
    #[arg(long, requires = "workers_csv")]
    tasks_csv: Option<PathBuf>,
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value = "sweep_output")]
    output_dir: PathBuf,
    #[arg(long)]
    no_progress: bool,
}

fn parse_size(value: &str) -> Result<(usize, usize), String> {
    let (workers, tasks) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WORKERSxTASKS, got {value:?}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|error| format!("{value:?}: {error}"))
    };
    Ok((parse(workers)?, parse(tasks)?))
}

fn sweep(args: SweepArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    let source = match (args.workers_csv, args.tasks_csv) {
        (Some(workers), Some(tasks)) => InstanceSource::Files { workers, tasks },
        _ => InstanceSource::Synthetic(GeneratorSettings::default()),
    };

    let sets = ExperimentSpace::new()
        .with_base(base)
        .with_source(source)
        .sizes(args.sizes)
        .solvers(args.solvers)
        .grid_dimensions(args.grid)
        .backlog_sizes(args.backlog)
        .repetitions(args.repetitions)
        .base_seed(args.seed)
        .generate();
    info!(runs = sets.len(), "starting sweep");

    let results = run_parallel_experiments_with_progress(&sets, args.threads, !args.no_progress)?;
    let summaries = summarize(&results);
    for summary in &summaries {
        info!(
            experiment = %summary.experiment_id,
            runs = summary.runs,
            failed = summary.failed_runs,
            avg_reward = summary.avg_reward,
            avg_elapsed_secs = summary.avg_elapsed_secs,
            "summary"
        );
    }

    export_to_csv(&results, args.output_dir.join("results.csv"))?;
    export_to_json(&results, args.output_dir.join("results.json"))?;
    export_summary_to_csv(&summaries, args.output_dir.join("summary.csv"))?;
    export_summary_to_json(&summaries, args.output_dir.join("summary.json"))?;
    info!(output = %args.output_dir.display(), "sweep exported");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Sweep(args) => sweep(args),
        Commands::Generate {
            workers,
            tasks,
            seed,
            workers_out,
            tasks_out,
        } => {
            GeneratorSettings::default()
                .generate(workers, tasks, seed)
                .save(&workers_out, &tasks_out)?;
            info!(workers, tasks, seed, "instance written");
            Ok(())
        }
        Commands::ProcessRaw {
            raw_workers,
            raw_tasks,
            workers_out,
            tasks_out,
            seed,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            process_raw_workers(&raw_workers, &workers_out)?;
            process_raw_tasks(&raw_tasks, &tasks_out, &mut rng)?;
            Ok(())
        }
    }
}
