use crate::error::{DispatchError, Result};
use crate::model::{Task, Worker};
use crate::spatial::BoundingBox;

/// Workers and tasks that fall inside one grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
}

impl GridCell {
    pub fn is_solvable(&self) -> bool {
        !self.workers.is_empty() && !self.tasks.is_empty()
    }
}

/// An `n x n` partition of an instance's bounding box.
///
/// Rows split latitude, columns split longitude, and cells are stored
/// row-major. Each cell covers `[min, min + Δ)` on both axes except the last
/// row and column, which also include the global maximum, so every point
/// lands in exactly one cell. An axis with zero span maps everything to index 0.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    dimension: usize,
    bounds: Option<BoundingBox>,
    cells: Vec<GridCell>,
}

impl SpatialGrid {
    /// Partition `workers` and `tasks` in a single pass.
    pub fn build(workers: &[Worker], tasks: &[Task], dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(DispatchError::InvalidConfig(
                "grid dimension must be at least 1".to_string(),
            ));
        }

        let mut cells: Vec<GridCell> = (0..dimension * dimension)
            .map(|index| GridCell {
                row: index / dimension,
                col: index % dimension,
                ..Default::default()
            })
            .collect();
        let mut grid = Self {
            dimension,
            bounds: BoundingBox::from_instance(workers, tasks),
            cells: Vec::new(),
        };

        for worker in workers {
            let (row, col) = grid.cell_of(worker.lat, worker.lon);
            cells[row * dimension + col].workers.push(*worker);
        }
        for task in tasks {
            let (row, col) = grid.cell_of(task.lat, task.lon);
            cells[row * dimension + col].tasks.push(*task);
        }

        grid.cells = cells;
        Ok(grid)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// `(row, col)` of the cell containing a point.
    pub fn cell_of(&self, lat: f64, lon: f64) -> (usize, usize) {
        match self.bounds {
            None => (0, 0),
            Some(bounds) => (
                axis_index(lat, bounds.min_lat, bounds.lat_span(), self.dimension),
                axis_index(lon, bounds.min_lon, bounds.lon_span(), self.dimension),
            ),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row >= self.dimension || col >= self.dimension {
            return None;
        }
        self.cells.get(row * self.dimension + col)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<GridCell> {
        self.cells
    }
}

fn axis_index(value: f64, min: f64, span: f64, dimension: usize) -> usize {
    if !(span > 0.0) {
        return 0;
    }
    let delta = span / dimension as f64;
    let index = ((value - min) / delta).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(dimension - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: u64, lat: f64, lon: f64) -> Worker {
        Worker::new(id, lat, lon, 1.0)
    }

    fn task(id: u64, lat: f64, lon: f64) -> Task {
        Task::new(id, lat, lon)
    }

    #[test]
    fn interior_boundaries_are_half_open() {
        let workers = [worker(0, 0.0, 0.0), worker(1, 4.0, 4.0)];
        let grid = SpatialGrid::build(&workers, &[], 2).unwrap();

        assert_eq!(grid.cell_of(1.999, 0.0), (0, 0));
        assert_eq!(grid.cell_of(2.0, 0.0), (1, 0));
        assert_eq!(grid.cell_of(0.0, 2.0), (0, 1));
    }

    #[test]
    fn global_maximum_lands_in_last_cell() {
        let workers = [worker(0, 0.0, 0.0), worker(1, 4.0, 4.0)];
        let tasks = [task(0, 4.0, 0.0)];
        let grid = SpatialGrid::build(&workers, &tasks, 2).unwrap();

        assert_eq!(grid.get(1, 1).unwrap().workers, vec![workers[1]]);
        assert_eq!(grid.get(1, 0).unwrap().tasks, vec![tasks[0]]);
        assert_eq!(grid.get(0, 0).unwrap().workers, vec![workers[0]]);
    }

    #[test]
    fn zero_span_axis_collapses_to_first_index() {
        let workers = [worker(0, 1.0, 0.0), worker(1, 1.0, 3.0)];
        let grid = SpatialGrid::build(&workers, &[], 3).unwrap();

        assert_eq!(grid.cell_of(1.0, 0.0), (0, 0));
        assert_eq!(grid.cell_of(1.0, 3.0), (0, 2));
    }

    #[test]
    fn cells_are_row_major() {
        let grid = SpatialGrid::build(&[worker(0, 0.0, 0.0)], &[], 3).unwrap();
        let coords: Vec<(usize, usize)> = grid.cells().iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(coords[..4], [(0, 0), (0, 1), (0, 2), (1, 0)]);
        assert_eq!(coords.len(), 9);
        assert!(grid.get(3, 0).is_none());
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            SpatialGrid::build(&[], &[], 0),
            Err(DispatchError::InvalidConfig(_))
        ));
    }
}
