use std::collections::VecDeque;

use super::cell::{Cell, Connectivity, Direction};
use crate::error::{MazeError, Result};

/// Orientation of the wall between two orthogonally adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Wall below a cell, between `(x, y)` and `(x, y + 1)`.
    Horizontal,
    /// Wall to the right of a cell, between `(x, y)` and `(x + 1, y)`.
    Vertical,
}

/// Cell graph of a maze: which orthogonal walls are open, the movement model,
/// and per-cell traversal costs.
///
/// Each undirected edge is stored once (as the east or south wall of the
/// lower cell), so passability is symmetric by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u16,
    height: u16,
    connectivity: Connectivity,
    /// `east[i]`: passage between cell `i` and its east neighbor
    east: Box<[bool]>,
    /// `south[i]`: passage between cell `i` and its south neighbor
    south: Box<[bool]>,
    costs: Box<[f64]>,
}

impl Grid {
    /// Creates a grid of the given size with every wall closed.
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Grid {
            width,
            height,
            connectivity: Connectivity::Four,
            east: vec![false; len].into_boxed_slice(),
            south: vec![false; len].into_boxed_slice(),
            costs: vec![1.0; len].into_boxed_slice(),
        }
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.east.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major index of an in-bounds cell. Check untrusted cells with
    /// [`Grid::in_bounds`] first.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `cell` is out of bounds. Release builds
    /// return an index that aliases another cell or lies past the end.
    pub fn index(&self, cell: Cell) -> usize {
        debug_assert!(self.in_bounds(cell), "cell {cell} is out of bounds");
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    /// Locates the stored wall between two orthogonally adjacent in-bounds cells.
    fn wall_between(&self, a: Cell, b: Cell) -> Option<(Orientation, usize)> {
        if !self.in_bounds(a) || !self.in_bounds(b) || !a.is_orthogonal_to(b) {
            return None;
        }
        let from = std::cmp::min(a, b);
        let orientation = if a.y == b.y {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        Some((orientation, self.index(from)))
    }

    /// Opens the wall between orthogonally adjacent cells `a` and `b`.
    ///
    /// Returns `true` if a wall was removed, `false` if the passage was already open.
    /// Only maze generation (and hand-built test grids) should carve.
    pub fn carve(&mut self, a: Cell, b: Cell) -> Result<bool> {
        let (orientation, idx) = self.wall_between(a, b).ok_or_else(|| {
            MazeError::invalid(format!("cannot carve between non-adjacent cells {a} and {b}"))
        })?;
        let slot = match orientation {
            Orientation::Vertical => &mut self.east[idx],
            Orientation::Horizontal => &mut self.south[idx],
        };
        let carved = !*slot;
        *slot = true;
        Ok(carved)
    }

    /// Whether the orthogonal wall between `a` and `b` is open.
    pub fn is_open(&self, a: Cell, b: Cell) -> bool {
        match self.wall_between(a, b) {
            Some((Orientation::Vertical, idx)) => self.east[idx],
            Some((Orientation::Horizontal, idx)) => self.south[idx],
            None => false,
        }
    }

    /// Whether a single move from `a` to `b` is allowed under the grid's movement model.
    ///
    /// A diagonal move is allowed on 8-connected grids when at least one of the
    /// two L-shaped detours through the orthogonal corner cells is open.
    pub fn is_passable(&self, a: Cell, b: Cell) -> bool {
        if a.is_orthogonal_to(b) {
            return self.is_open(a, b);
        }
        if self.connectivity != Connectivity::Eight || !a.is_diagonal_to(b) {
            return false;
        }
        let corner_x = Cell::new(b.x, a.y);
        let corner_y = Cell::new(a.x, b.y);
        (self.is_open(a, corner_x) && self.is_open(corner_x, b))
            || (self.is_open(a, corner_y) && self.is_open(corner_y, b))
    }

    /// In-bounds neighbors of `cell` with their passability, in the fixed
    /// order N, E, S, W (then NE, SE, SW, NW on 8-connected grids).
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Cell, bool)> + '_ {
        let directions: &'static [Direction] = if self.in_bounds(cell) {
            self.connectivity.directions()
        } else {
            // No neighbors if the coordinate is out of bounds
            &[]
        };
        directions
            .iter()
            .filter_map(move |&d| cell.step(d))
            .filter(move |&n| self.in_bounds(n))
            .map(move |n| (n, self.is_passable(cell, n)))
    }

    /// In-bounds orthogonal neighbors of `cell` regardless of walls, N, E, S, W.
    pub fn orthogonal_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::ORTHOGONAL
            .iter()
            .filter_map(move |&d| cell.step(d))
            .filter(move |&n| self.in_bounds(n) && self.in_bounds(cell))
    }

    /// Neighbors reachable in one move.
    pub fn passable_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.neighbors(cell)
            .filter_map(|(n, passable)| passable.then_some(n))
    }

    /// Traversal cost of a cell, 1.0 unless set otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of bounds.
    pub fn cost(&self, cell: Cell) -> f64 {
        self.costs[self.index(cell)]
    }

    /// Sets the traversal cost of a cell. Costs must be finite and at least 1.0
    /// so every heuristic stays admissible.
    pub fn set_cost(&mut self, cell: Cell, cost: f64) -> Result<()> {
        if !self.in_bounds(cell) {
            return Err(MazeError::invalid(format!("cell {cell} is out of bounds")));
        }
        if !cost.is_finite() || cost < 1.0 {
            return Err(MazeError::invalid(format!(
                "cell cost must be finite and >= 1.0, got {cost}"
            )));
        }
        let idx = self.index(cell);
        self.costs[idx] = cost;
        Ok(())
    }

    /// Cost of moving between adjacent cells `a` and `b`: the mean of both cell
    /// costs, scaled by √2 for diagonal moves. Symmetric in `a` and `b`.
    pub fn step_cost(&self, a: Cell, b: Cell) -> f64 {
        let base = if a.is_diagonal_to(b) {
            std::f64::consts::SQRT_2
        } else {
            1.0
        };
        base * (self.cost(a) + self.cost(b)) / 2.0
    }

    /// Number of open orthogonal passages.
    pub fn passage_count(&self) -> usize {
        self.east.iter().chain(self.south.iter()).filter(|&&open| open).count()
    }

    /// Number of cells reachable from `from` (itself included) through open passages.
    pub fn reachable_count(&self, from: Cell) -> usize {
        if !self.in_bounds(from) {
            return 0;
        }
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([from]);
        seen[self.index(from)] = true;
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            count += 1;
            for n in self.orthogonal_neighbors(cell) {
                let idx = self.index(n);
                if !seen[idx] && self.is_open(cell, n) {
                    seen[idx] = true;
                    queue.push_back(n);
                }
            }
        }
        count
    }

    /// Whether every cell belongs to a single connected component.
    pub fn is_connected(&self) -> bool {
        self.is_empty() || self.reachable_count(Cell::new(0, 0)) == self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carve_is_symmetric() {
        let mut grid = Grid::new(3, 3);
        let a = Cell::new(1, 1);
        let b = Cell::new(1, 2);
        assert!(grid.carve(a, b).unwrap());
        // Carving the same wall again reports no change
        assert!(!grid.carve(b, a).unwrap());
        assert!(grid.is_open(a, b));
        assert!(grid.is_open(b, a));
        assert_eq!(grid.passage_count(), 1);
    }

    #[test]
    fn test_carve_rejects_non_adjacent() {
        let mut grid = Grid::new(3, 3);
        assert!(grid.carve(Cell::new(0, 0), Cell::new(1, 1)).is_err());
        assert!(grid.carve(Cell::new(0, 0), Cell::new(2, 0)).is_err());
        assert!(grid.carve(Cell::new(2, 2), Cell::new(3, 2)).is_err());
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = Grid::new(5, 5);
        assert!(!grid.in_bounds(Cell::new(5, 5)));
        assert!(!grid.in_bounds(Cell::new(0, 5)));
        assert!(!grid.in_bounds(Cell::new(5, 0)));
        assert!(grid.in_bounds(Cell::new(4, 4)));
        assert_eq!(grid.neighbors(Cell::new(9, 9)).count(), 0);
    }

    #[test]
    fn test_neighbor_order_and_passability() {
        let mut grid = Grid::new(3, 3);
        let center = Cell::new(1, 1);
        grid.carve(center, Cell::new(2, 1)).unwrap();
        let neighbors = grid.neighbors(center).collect::<Vec<_>>();
        assert_eq!(
            neighbors,
            vec![
                (Cell::new(1, 0), false),
                (Cell::new(2, 1), true),
                (Cell::new(1, 2), false),
                (Cell::new(0, 1), false),
            ]
        );
        let corner = grid.neighbors(Cell::new(0, 0)).map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(corner, vec![Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_diagonal_needs_open_detour() {
        let mut grid = Grid::new(2, 2).with_connectivity(Connectivity::Eight);
        let a = Cell::new(0, 0);
        let b = Cell::new(1, 1);
        assert!(!grid.is_passable(a, b));
        grid.carve(a, Cell::new(1, 0)).unwrap();
        assert!(!grid.is_passable(a, b));
        grid.carve(Cell::new(1, 0), b).unwrap();
        assert!(grid.is_passable(a, b));
        assert!(grid.is_passable(b, a));
        assert_eq!(grid.neighbors(a).count(), 3);

        let four = grid.clone().with_connectivity(Connectivity::Four);
        assert!(!four.is_passable(a, b));
        assert_eq!(four.neighbors(a).count(), 2);
    }

    #[test]
    fn test_step_cost() {
        let mut grid = Grid::new(3, 3);
        assert_eq!(grid.step_cost(Cell::new(0, 0), Cell::new(1, 0)), 1.0);
        grid.set_cost(Cell::new(1, 0), 3.0).unwrap();
        assert_eq!(grid.step_cost(Cell::new(0, 0), Cell::new(1, 0)), 2.0);
        assert_eq!(grid.step_cost(Cell::new(1, 0), Cell::new(0, 0)), 2.0);
        let diagonal = grid.step_cost(Cell::new(1, 1), Cell::new(2, 2));
        assert!((diagonal - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(grid.cost(Cell::new(1, 0)), 3.0);
    }

    #[test]
    fn test_set_cost_validation() {
        let mut grid = Grid::new(2, 2);
        assert!(grid.set_cost(Cell::new(0, 0), 0.5).is_err());
        assert!(grid.set_cost(Cell::new(0, 0), f64::NAN).is_err());
        assert!(grid.set_cost(Cell::new(2, 0), 2.0).is_err());
        assert_eq!(grid.cost(Cell::new(0, 0)), 1.0);
    }

    #[test]
    #[should_panic]
    fn test_cost_out_of_bounds_panics() {
        Grid::new(2, 2).cost(Cell::new(0, 2));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds_panics_in_debug() {
        // (3, 0) would alias (1, 1) on a 2-wide grid
        Grid::new(2, 2).index(Cell::new(3, 0));
    }

    #[test]
    fn test_reachable_count() {
        let mut grid = Grid::new(3, 1);
        assert_eq!(grid.reachable_count(Cell::new(0, 0)), 1);
        assert!(!grid.is_connected());
        grid.carve(Cell::new(0, 0), Cell::new(1, 0)).unwrap();
        grid.carve(Cell::new(1, 0), Cell::new(2, 0)).unwrap();
        assert_eq!(grid.reachable_count(Cell::new(2, 0)), 3);
        assert!(grid.is_connected());
    }
}
