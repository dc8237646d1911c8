//! Problem instances on disk.
//!
//! Processed instances are two CSV files with a header row:
//!
//! - workers: `lat,lon,min_lat,min_lon,max_lat,max_lon,velocity`
//! - tasks: `lat,lon,deadline,workload,expected_time,penalty_rate,reward`
//!
//! Records carry no id column; ids are row indices. Raw files (one `;`
//! separated record per line) can be converted with [`process_raw_workers`]
//! and [`process_raw_tasks`].

use std::fs;
use std::path::Path;

use dispatch_core::model::{Task, Worker};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generate::task_from_deadline;

/// Workers and tasks of one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
}

impl Instance {
    /// Load a processed instance from its worker and task CSV files.
    pub fn load(
        workers_path: impl AsRef<Path>,
        tasks_path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let instance = Self {
            workers: read_workers(workers_path)?,
            tasks: read_tasks(tasks_path)?,
        };
        instance.validate()?;
        Ok(instance)
    }

    /// Write the instance as processed CSV files.
    pub fn save(
        &self,
        workers_path: impl AsRef<Path>,
        tasks_path: impl AsRef<Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        write_workers(&self.workers, workers_path)?;
        write_tasks(&self.tasks, tasks_path)
    }

    /// Keep only the first `num_workers` workers and `num_tasks` tasks.
    pub fn truncated(mut self, num_workers: usize, num_tasks: usize) -> Self {
        self.workers.truncate(num_workers);
        self.tasks.truncate(num_tasks);
        self
    }

    pub fn validate(&self) -> dispatch_core::error::Result<()> {
        for worker in &self.workers {
            worker.validate()?;
        }
        for task in &self.tasks {
            task.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WorkerRecord {
    lat: f64,
    lon: f64,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    velocity: f64,
}

impl WorkerRecord {
    fn into_worker(self, id: u64) -> Worker {
        Worker::new(id, self.lat, self.lon, self.velocity).with_region(
            self.min_lat,
            self.min_lon,
            self.max_lat,
            self.max_lon,
        )
    }
}

impl From<&Worker> for WorkerRecord {
    fn from(worker: &Worker) -> Self {
        Self {
            lat: worker.lat,
            lon: worker.lon,
            min_lat: worker.min_lat,
            min_lon: worker.min_lon,
            max_lat: worker.max_lat,
            max_lon: worker.max_lon,
            velocity: worker.velocity,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TaskRecord {
    lat: f64,
    lon: f64,
    deadline: f64,
    workload: f64,
    expected_time: f64,
    penalty_rate: f64,
    reward: f64,
}

impl TaskRecord {
    fn into_task(self, id: u64) -> Task {
        Task::new(id, self.lat, self.lon)
            .with_deadline(self.deadline, self.expected_time)
            .with_workload(self.workload)
            .with_reward(self.reward, self.penalty_rate)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            lat: task.lat,
            lon: task.lon,
            deadline: task.deadline,
            workload: task.workload,
            expected_time: task.expected_time,
            penalty_rate: task.penalty_rate,
            reward: task.reward,
        }
    }
}

pub fn read_workers(path: impl AsRef<Path>) -> Result<Vec<Worker>, Box<dyn std::error::Error>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut workers = Vec::new();
    for (row, record) in rdr.deserialize::<WorkerRecord>().enumerate() {
        workers.push(record?.into_worker(row as u64));
    }
    Ok(workers)
}

pub fn read_tasks(path: impl AsRef<Path>) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut tasks = Vec::new();
    for (row, record) in rdr.deserialize::<TaskRecord>().enumerate() {
        tasks.push(record?.into_task(row as u64));
    }
    Ok(tasks)
}

pub fn write_workers(
    workers: &[Worker],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for worker in workers {
        wtr.serialize(WorkerRecord::from(worker))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_tasks(
    tasks: &[Task],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for task in tasks {
        wtr.serialize(TaskRecord::from(task))?;
    }
    wtr.flush()?;
    Ok(())
}

fn raw_fields(line: &str, expected: usize) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() < expected {
        return Err(format!("expected {expected} fields, found {}: {line:?}", fields.len()).into());
    }
    fields
        .iter()
        .map(|field| {
            let cleaned = field.trim().trim_start_matches('[').trim_end_matches(']').trim();
            cleaned
                .parse::<f64>()
                .map_err(|error| -> Box<dyn std::error::Error> {
                    format!("bad field {field:?} in {line:?}: {error}").into()
                })
        })
        .collect()
}

/// Parse one raw worker line:
/// `id;lat;lon;capacity;activeness;[min_lat;min_lon;max_lat;max_lon];reliability;velocity`.
pub fn parse_raw_worker(id: u64, line: &str) -> Result<Worker, Box<dyn std::error::Error>> {
    let f = raw_fields(line, 11)?;
    Ok(Worker::new(id, f[1], f[2], f[10]).with_region(f[5], f[6], f[7], f[8]))
}

/// Parse one raw task line:
/// `lat;lon;arrival_time;expiry_time;requirement;confidence;entropy`.
///
/// The deadline is the length of the arrival/expiry window; the remaining
/// attributes are drawn with [`task_from_deadline`].
pub fn parse_raw_task<R: Rng + ?Sized>(
    id: u64,
    line: &str,
    rng: &mut R,
) -> Result<Task, Box<dyn std::error::Error>> {
    let f = raw_fields(line, 7)?;
    let deadline = f[3] - f[2];
    if !(deadline > 0.0) {
        return Err(format!("task window must be positive, got {deadline}: {line:?}").into());
    }
    Ok(task_from_deadline(id, f[0], f[1], deadline, rng))
}

fn raw_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents.lines().filter(|line| !line.trim().is_empty())
}

/// Convert a raw worker file into a processed worker CSV.
pub fn process_raw_workers(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(input.as_ref())?;
    let workers = raw_lines(&contents)
        .enumerate()
        .map(|(row, line)| parse_raw_worker(row as u64, line))
        .collect::<Result<Vec<_>, _>>()?;
    write_workers(&workers, output.as_ref())?;
    info!(input = %input.as_ref().display(), workers = workers.len(), "processed raw workers");
    Ok(workers.len())
}

/// Convert a raw task file into a processed task CSV.
pub fn process_raw_tasks<R: Rng + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    rng: &mut R,
) -> Result<usize, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(input.as_ref())?;
    let tasks = raw_lines(&contents)
        .enumerate()
        .map(|(row, line)| parse_raw_task(row as u64, line, rng))
        .collect::<Result<Vec<_>, _>>()?;
    write_tasks(&tasks, output.as_ref())?;
    info!(input = %input.as_ref().display(), tasks = tasks.len(), "processed raw tasks");
    Ok(tasks.len())
}
