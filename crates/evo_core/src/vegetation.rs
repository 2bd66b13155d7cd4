//! Dense boolean vegetation grid (spec §4.3). A cell has no identity;
//! presence is the only datum.

use evo_data::Position;

use crate::rng::Rng;

/// Four orthogonal neighbour directions, in the fixed order the spec
/// requires: left, right, up, down.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone)]
pub struct VegetationGrid {
    cols: usize,
    rows: usize,
    tile_size: f64,
    cells: Vec<bool>,
}

impl VegetationGrid {
    pub fn new(world_width: f64, world_height: f64, tile_size: f64) -> Self {
        let cols = (world_width / tile_size).floor().max(1.0) as usize;
        let rows = (world_height / tile_size).floor().max(1.0) as usize;
        Self {
            cols,
            rows,
            tile_size,
            cells: vec![false; cols * rows],
        }
    }

    fn index(&self, gx: i64, gy: i64) -> Option<usize> {
        if gx < 0 || gy < 0 || gx as usize >= self.cols || gy as usize >= self.rows {
            None
        } else {
            Some(gy as usize * self.cols + gx as usize)
        }
    }

    pub fn has(&self, gx: i64, gy: i64) -> bool {
        self.index(gx, gy).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn set(&mut self, gx: i64, gy: i64) {
        if let Some(i) = self.index(gx, gy) {
            self.cells[i] = true;
        }
    }

    pub fn remove(&mut self, gx: i64, gy: i64) {
        if let Some(i) = self.index(gx, gy) {
            self.cells[i] = false;
        }
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn world_to_grid(&self, x: f64, y: f64) -> (i64, i64) {
        ((x / self.tile_size).floor() as i64, (y / self.tile_size).floor() as i64)
    }

    pub fn grid_to_world(&self, gx: i64, gy: i64) -> Position {
        Position::new(
            gx as f64 * self.tile_size + self.tile_size / 2.0,
            gy as f64 * self.tile_size + self.tile_size / 2.0,
        )
    }

    /// In-bounds neighbours only, in fixed order {left,right,up,down}.
    pub fn neighbors(&self, gx: i64, gy: i64) -> Vec<(i64, i64)> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| (gx + dx, gy + dy))
            .filter(|(nx, ny)| self.index(*nx, *ny).is_some())
            .collect()
    }

    /// Set each cell with probability `density`, row-major order, one
    /// Bernoulli draw per cell.
    pub fn initialize(&mut self, density: f64, rng: &mut Rng) {
        for gy in 0..self.rows as i64 {
            for gx in 0..self.cols as i64 {
                if rng.bool_with_prob(density) {
                    self.set(gx, gy);
                }
            }
        }
    }

    /// Snapshot occupied cells first (no growth feeds back into the same
    /// pass), then for each occupied cell and each empty neighbour, set it
    /// with probability `rate`. One PRNG draw per empty neighbour checked.
    pub fn spread(&mut self, rate: f64, rng: &mut Rng) {
        let occupied: Vec<(i64, i64)> = (0..self.rows as i64)
            .flat_map(|gy| (0..self.cols as i64).map(move |gx| (gx, gy)))
            .filter(|(gx, gy)| self.has(*gx, *gy))
            .collect();

        for (gx, gy) in occupied {
            for (nx, ny) in self.neighbors(gx, gy) {
                if !self.has(nx, ny) && rng.bool_with_prob(rate) {
                    self.set(nx, ny);
                }
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// All occupied cells as world-space positions, for snapshot queries.
    pub fn occupied_positions(&self) -> Vec<Position> {
        (0..self.rows as i64)
            .flat_map(|gy| (0..self.cols as i64).map(move |gx| (gx, gy)))
            .filter(|(gx, gy)| self.has(*gx, *gy))
            .map(|(gx, gy)| self.grid_to_world(gx, gy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_grid_and_back() {
        let grid = VegetationGrid::new(100.0, 100.0, 10.0);
        assert_eq!(grid.world_to_grid(25.0, 35.0), (2, 3));
        assert_eq!(grid.grid_to_world(2, 3), Position::new(25.0, 35.0));
    }

    #[test]
    fn test_neighbors_fixed_order_and_bounds() {
        let grid = VegetationGrid::new(30.0, 30.0, 10.0);
        assert_eq!(grid.neighbors(0, 0), vec![(1, 0), (0, 1)]);
        assert_eq!(grid.neighbors(1, 1), vec![(0, 1), (2, 1), (1, 0), (1, 2)]);
    }

    #[test]
    fn test_zero_density_initializes_empty() {
        let mut grid = VegetationGrid::new(50.0, 50.0, 10.0);
        let mut rng = Rng::new(1);
        grid.initialize(0.0, &mut rng);
        assert_eq!(grid.count(), 0);
    }

    #[test]
    fn test_full_density_initializes_full() {
        let mut grid = VegetationGrid::new(50.0, 50.0, 10.0);
        let mut rng = Rng::new(1);
        grid.initialize(1.0, &mut rng);
        assert_eq!(grid.count(), grid.cols() * grid.rows());
    }

    #[test]
    fn test_zero_spread_rate_never_increases_count() {
        let mut grid = VegetationGrid::new(50.0, 50.0, 10.0);
        let mut rng = Rng::new(2);
        grid.initialize(0.5, &mut rng);
        let before = grid.count();
        grid.spread(0.0, &mut rng);
        assert_eq!(grid.count(), before);
    }

    #[test]
    fn test_set_has_remove_roundtrip() {
        let mut grid = VegetationGrid::new(50.0, 50.0, 10.0);
        assert!(!grid.has(1, 1));
        grid.set(1, 1);
        assert!(grid.has(1, 1));
        grid.remove(1, 1);
        assert!(!grid.has(1, 1));
    }
}
