pub mod cell;
pub mod grid;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use cell::{Cell, Connectivity, Direction};
pub use grid::{Grid, Orientation};

use crate::error::{MazeError, Result};
use crate::rng::MazeRng;

/// Rule for choosing start and goal once a grid is carved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Start at the top-left cell, goal at the bottom-right cell.
    #[default]
    Corners,
    /// Start, then goal, drawn uniformly from the placement stream. The goal is
    /// redrawn until it differs from the start (unless the grid has one cell).
    Random,
}

impl Placement {
    pub fn place(self, width: u16, height: u16, rng: &mut MazeRng) -> (Cell, Cell) {
        match self {
            Placement::Corners => (
                Cell::new(0, 0),
                Cell::new(width.saturating_sub(1), height.saturating_sub(1)),
            ),
            Placement::Random => {
                let mut draw = || {
                    Cell::new(
                        rng.next_int(width as usize) as u16,
                        rng.next_int(height as usize) as u16,
                    )
                };
                let start = draw();
                let mut goal = draw();
                while goal == start && width as usize * height as usize > 1 {
                    goal = draw();
                }
                (start, goal)
            }
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Corners => write!(f, "corners"),
            Placement::Random => write!(f, "random"),
        }
    }
}

impl std::str::FromStr for Placement {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "corners" => Ok(Placement::Corners),
            "random" => Ok(Placement::Random),
            _ => Err(MazeError::invalid(format!("unknown placement '{s}'"))),
        }
    }
}

/// A carved grid with designated start and goal cells.
///
/// The grid is only reachable through a shared reference, so nothing carves
/// once the maze has been assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    grid: Grid,
    start: Cell,
    goal: Cell,
}

impl Maze {
    pub fn new(grid: Grid, start: Cell, goal: Cell) -> Result<Self> {
        for (name, cell) in [("start", start), ("goal", goal)] {
            if !grid.in_bounds(cell) {
                return Err(MazeError::invalid(format!(
                    "{name} {cell} lies outside the {}x{} grid",
                    grid.width(),
                    grid.height()
                )));
            }
        }
        Ok(Maze { grid, start, goal })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    /// Same walls, different endpoints.
    pub fn with_endpoints(&self, start: Cell, goal: Cell) -> Result<Self> {
        Maze::new(self.grid.clone(), start, goal)
    }

    /// Whether consecutive cells of `path` are passable neighbors and the path
    /// runs from start to goal.
    pub fn is_valid_path(&self, path: &[Cell]) -> bool {
        path.first() == Some(&self.start)
            && path.last() == Some(&self.goal)
            && path.windows(2).all(|w| self.grid.is_passable(w[0], w[1]))
    }

    /// ASCII rendering with `path` overlaid as `.` on cells and the passages between them.
    pub fn render_with_path(&self, path: &[Cell]) -> String {
        let (w, h) = (self.width() as usize * 2 + 1, self.height() as usize * 2 + 1);
        let mut buf = vec![vec!['#'; w]; h];
        let to_buf = |c: Cell| (c.x as usize * 2 + 1, c.y as usize * 2 + 1);

        for cell in self.grid.cells() {
            let (bx, by) = to_buf(cell);
            buf[by][bx] = ' ';
            if let Some(east) = cell.step(Direction::East) {
                if self.grid.is_open(cell, east) {
                    buf[by][bx + 1] = ' ';
                }
            }
            if let Some(south) = cell.step(Direction::South) {
                if self.grid.is_open(cell, south) {
                    buf[by + 1][bx] = ' ';
                }
            }
        }

        for (i, &cell) in path.iter().enumerate() {
            if !self.grid.in_bounds(cell) {
                continue;
            }
            let (bx, by) = to_buf(cell);
            buf[by][bx] = '.';
            if let Some(&prev) = i.checked_sub(1).and_then(|p| path.get(p)) {
                // Draw the passage between orthogonal steps only
                if prev.is_orthogonal_to(cell) {
                    let (px, py) = to_buf(prev);
                    buf[(by + py) / 2][(bx + px) / 2] = '.';
                }
            }
        }

        let (sx, sy) = to_buf(self.start);
        buf[sy][sx] = 'S';
        let (gx, gy) = to_buf(self.goal);
        buf[gy][gx] = 'G';

        buf.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_with_path(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Maze {
        let mut grid = Grid::new(3, 1);
        grid.carve(Cell::new(0, 0), Cell::new(1, 0)).unwrap();
        grid.carve(Cell::new(1, 0), Cell::new(2, 0)).unwrap();
        Maze::new(grid, Cell::new(0, 0), Cell::new(2, 0)).unwrap()
    }

    #[test]
    fn test_rejects_out_of_bounds_endpoints() {
        let grid = Grid::new(2, 2);
        assert!(Maze::new(grid.clone(), Cell::new(0, 0), Cell::new(2, 0)).is_err());
        assert!(Maze::new(grid, Cell::new(0, 3), Cell::new(1, 1)).is_err());
    }

    #[test]
    fn test_valid_path() {
        let maze = corridor();
        let path = [Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)];
        assert!(maze.is_valid_path(&path));
        assert!(!maze.is_valid_path(&path[..2]));
        assert!(!maze.is_valid_path(&[Cell::new(0, 0), Cell::new(2, 0)]));
        assert!(!maze.is_valid_path(&[]));
    }

    #[test]
    fn test_render_ascii() {
        let maze = corridor();
        assert_eq!(maze.to_string(), "#######\n#S   G#\n#######");
        let path = [Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)];
        assert_eq!(maze.render_with_path(&path), "#######\n#S...G#\n#######");
    }

    #[test]
    fn test_corner_placement() {
        let mut rng = MazeRng::new(1);
        let (start, goal) = Placement::Corners.place(4, 3, &mut rng);
        assert_eq!(start, Cell::new(0, 0));
        assert_eq!(goal, Cell::new(3, 2));
        // Corners never touch the stream
        assert_eq!(rng, MazeRng::new(1));
    }

    #[test]
    fn test_random_placement_is_reproducible_and_distinct() {
        for seed in 0..50 {
            let a = Placement::Random.place(4, 4, &mut MazeRng::new(seed));
            let b = Placement::Random.place(4, 4, &mut MazeRng::new(seed));
            assert_eq!(a, b);
            assert_ne!(a.0, a.1);
            assert!(a.0.x < 4 && a.0.y < 4 && a.1.x < 4 && a.1.y < 4);
        }
        let single = Placement::Random.place(1, 1, &mut MazeRng::new(3));
        assert_eq!(single, (Cell::new(0, 0), Cell::new(0, 0)));
    }
}
