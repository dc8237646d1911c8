//! Spatial operations: travel times, worker/task feasibility and bounding boxes.
//!
//! This module provides:
//!
//! - **travel_time**: Euclidean distance in coordinate space divided by velocity
//! - **is_available**: service-region and deadline feasibility of a worker for a task
//! - **sorted_available_workers**: feasible workers ordered by travel time
//! - **finish_time**: cooperative completion time of a worker group
//! - **BoundingBox**: extent of an instance, used by the grid partition
//!
//! Coordinates are treated as planar; no geodesic correction is applied.

use crate::model::{Task, Worker};

/// Euclidean distance between two points divided by `velocity`.
pub fn travel_time(
    worker_lat: f64,
    worker_lon: f64,
    task_lat: f64,
    task_lon: f64,
    velocity: f64,
) -> f64 {
    let dlat = worker_lat - task_lat;
    let dlon = worker_lon - task_lon;
    (dlat * dlat + dlon * dlon).sqrt() / velocity
}

/// Travel time of `worker` to `task`.
pub fn worker_travel_time(worker: &Worker, task: &Task) -> f64 {
    travel_time(worker.lat, worker.lon, task.lat, task.lon, worker.velocity)
}

/// Whether `worker` can serve `task`.
///
/// False when the task lies outside the worker's service region or when the
/// worker cannot even reach the task before its deadline.
pub fn is_available(worker: &Worker, task: &Task) -> bool {
    if !worker.region_contains(task.lat, task.lon) {
        return false;
    }
    worker_travel_time(worker, task) <= task.deadline
}

/// Workers available for `task`, closest (by travel time) first.
///
/// The sort is stable, so workers with equal travel time keep their input order.
pub fn sorted_available_workers<'a, I>(workers: I, task: &Task) -> Vec<&'a Worker>
where
    I: IntoIterator<Item = &'a Worker>,
{
    let mut available: Vec<(f64, &Worker)> = workers
        .into_iter()
        .filter(|worker| is_available(worker, task))
        .map(|worker| (worker_travel_time(worker, task), worker))
        .collect();
    available.sort_by(|a, b| a.0.total_cmp(&b.0));
    available.into_iter().map(|(_, worker)| worker).collect()
}

/// Completion time of `task` when `workers` share its workload.
///
/// Every worker travels to the task and then works until the task is done, so
/// `finish * |workers| = Σ travel + workload`. The summed travel time matches
/// the finish-time constraint of the MILP formulation.
///
/// Callers must pass at least one worker; an empty group never finishes.
pub fn finish_time<'a, I>(workers: I, task: &Task) -> f64
where
    I: IntoIterator<Item = &'a Worker>,
{
    let (total_travel, count) = workers
        .into_iter()
        .fold((0.0, 0usize), |(total, count), worker| {
            (total + worker_travel_time(worker, task), count + 1)
        });
    debug_assert!(count > 0, "finish_time requires at least one worker");
    if count == 0 {
        return f64::INFINITY;
    }
    (total_travel + task.workload) / count as f64
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Extent of the given points, or `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (lat, lon)| {
            Some(match acc {
                None => Self {
                    min_lat: lat,
                    min_lon: lon,
                    max_lat: lat,
                    max_lon: lon,
                },
                Some(b) => Self {
                    min_lat: b.min_lat.min(lat),
                    min_lon: b.min_lon.min(lon),
                    max_lat: b.max_lat.max(lat),
                    max_lon: b.max_lon.max(lon),
                },
            })
        })
    }

    /// Extent over the union of worker and task positions.
    pub fn from_instance(workers: &[Worker], tasks: &[Task]) -> Option<Self> {
        Self::from_points(
            workers
                .iter()
                .map(|w| (w.lat, w.lon))
                .chain(tasks.iter().map(|t| (t.lat, t.lon))),
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}
