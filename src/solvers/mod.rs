//! Pathfinding over a [`Maze`] behind one contract.
//!
//! Every solver takes a maze and an optional heuristic and returns a
//! [`SearchTrace`]. Shared rules:
//!
//! * `start == goal` yields the one-cell path with zero expansions.
//! * An unreachable goal yields an empty path and [`SearchStatus::NoPathFound`].
//! * A raised cancel flag stops the search at its next expansion with
//!   [`SearchStatus::Interrupted`].
//! * Neighbors are explored in the grid's fixed order (N, E, S, W, then
//!   diagonals), and priority ties pop in insertion order, then row-major
//!   coordinate order, so repeated runs produce identical traces.
//!
//! The heuristic must be admissible for the grid's connectivity (see
//! [`Heuristic::admissible_for`]); solvers do not check the pairing and an
//! inadmissible one may return a longer path.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

mod a_star;
mod bfs;
mod bidirectional;
mod dijkstra;
mod frontier;

pub use a_star::AStar;
pub use bfs::Bfs;
pub use bidirectional::BidirectionalAStar;
pub use dijkstra::Dijkstra;

use crate::error::{MazeError, Result};
use crate::heuristics::Heuristic;
use crate::maze::{Cell, Grid, Maze};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Found,
    NoPathFound,
    /// Stopped by its cancel flag before reaching a verdict.
    Interrupted,
}

/// What a solver observed: the path it found and how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTrace {
    pub status: SearchStatus,
    /// Start to goal inclusive; empty when no path exists.
    pub path: Vec<Cell>,
    /// Sum of step costs along `path`.
    pub path_cost: f64,
    /// Cells in the order their neighbors were examined.
    pub visited_order: Vec<Cell>,
    pub node_expansions: usize,
}

impl SearchTrace {
    fn found(grid: &Grid, path: Vec<Cell>, visited_order: Vec<Cell>) -> Self {
        SearchTrace {
            status: SearchStatus::Found,
            path_cost: path_cost(grid, &path),
            path,
            node_expansions: visited_order.len(),
            visited_order,
        }
    }

    fn no_path(visited_order: Vec<Cell>) -> Self {
        SearchTrace {
            status: SearchStatus::NoPathFound,
            path: Vec::new(),
            path_cost: 0.0,
            node_expansions: visited_order.len(),
            visited_order,
        }
    }

    fn interrupted(visited_order: Vec<Cell>) -> Self {
        SearchTrace {
            status: SearchStatus::Interrupted,
            path: Vec::new(),
            path_cost: 0.0,
            node_expansions: visited_order.len(),
            visited_order,
        }
    }

    /// The trace for `start == goal`, if that is the case.
    fn trivial(maze: &Maze) -> Option<Self> {
        (maze.start() == maze.goal()).then(|| SearchTrace {
            status: SearchStatus::Found,
            path: vec![maze.start()],
            path_cost: 0.0,
            visited_order: Vec::new(),
            node_expansions: 0,
        })
    }

    /// Number of moves in the path.
    pub fn path_length(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Sum of step costs between consecutive cells.
pub fn path_cost(grid: &Grid, path: &[Cell]) -> f64 {
    path.windows(2).map(|w| grid.step_cost(w[0], w[1])).sum()
}

fn cancelled(cancel: &AtomicBool) -> bool {
    cancel.load(Ordering::Relaxed)
}

/// Walks parent links back from `to` and returns the path in forward order.
fn reconstruct(grid: &Grid, parents: &[Option<Cell>], to: Cell) -> Vec<Cell> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(parent) = parents[grid.index(current)] {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

/// The uniform solver contract.
pub trait Solver: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Searches from the maze start to its goal.
    fn solve(&self, maze: &Maze, heuristic: Option<Heuristic>) -> SearchTrace {
        self.solve_until(maze, heuristic, &AtomicBool::new(false))
    }

    /// Like [`Solver::solve`], but gives up once `cancel` is raised.
    fn solve_until(&self, maze: &Maze, heuristic: Option<Heuristic>, cancel: &AtomicBool) -> SearchTrace;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Bfs,
    Dijkstra,
    AStar,
    BidirectionalAStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Bfs,
        Algorithm::Dijkstra,
        Algorithm::AStar,
        Algorithm::BidirectionalAStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::AStar => "a_star",
            Algorithm::BidirectionalAStar => "bidirectional_a_star",
        }
    }

    pub fn solver(self) -> &'static dyn Solver {
        match self {
            Algorithm::Bfs => &Bfs,
            Algorithm::Dijkstra => &Dijkstra,
            Algorithm::AStar => &AStar,
            Algorithm::BidirectionalAStar => &BidirectionalAStar,
        }
    }

    pub fn requires_heuristic(self) -> bool {
        matches!(self, Algorithm::AStar | Algorithm::BidirectionalAStar)
    }

    /// A heuristic is mandatory for A* variants and must be absent otherwise.
    pub fn check_heuristic(self, heuristic: Option<Heuristic>) -> Result<()> {
        match (self.requires_heuristic(), heuristic) {
            (true, None) => Err(MazeError::invalid(format!(
                "{} requires a heuristic",
                self.name()
            ))),
            (false, Some(h)) => Err(MazeError::invalid(format!(
                "{} does not take a heuristic, got {h}",
                self.name()
            ))),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Algorithm::Dijkstra => write!(f, "Dijkstra's Algorithm"),
            Algorithm::AStar => write!(f, "A* Search"),
            Algorithm::BidirectionalAStar => write!(f, "Bidirectional A* Search"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| MazeError::invalid(format!("unknown algorithm '{s}'")))
    }
}

pub fn solve_maze(maze: &Maze, algorithm: Algorithm, heuristic: Option<Heuristic>) -> SearchTrace {
    algorithm.solver().solve(maze, heuristic)
}

pub fn solve_maze_until(
    maze: &Maze,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
    cancel: &AtomicBool,
) -> SearchTrace {
    algorithm.solver().solve_until(maze, heuristic, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Connectivity;

    /// 5x5 maze whose only route from (0,0) to (4,4) snakes through 9 cells
    /// (8 moves) while a dead-end pocket tempts the heuristic solvers.
    ///
    /// ```text
    /// S . . . .
    /// x x x x .
    /// . . . x .
    /// . x . x .
    /// . x . . G
    /// ```
    pub(crate) fn five_by_five() -> Maze {
        let mut grid = Grid::new(5, 5);
        let open = |grid: &mut Grid, cells: &[(u16, u16)]| {
            for w in cells.windows(2) {
                grid.carve(w[0].into(), w[1].into()).unwrap();
            }
        };
        open(&mut grid, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (4, 1), (4, 2), (4, 3), (4, 4)]);
        open(&mut grid, &[(3, 4), (2, 4), (2, 3), (2, 2), (1, 2), (0, 2), (0, 3), (0, 4)]);
        grid.carve(Cell::new(4, 4), Cell::new(3, 4)).unwrap();
        Maze::new(grid, Cell::new(0, 0), Cell::new(4, 4)).unwrap()
    }

    /// Two 3x3 rooms with no connection between them.
    pub(crate) fn disconnected() -> Maze {
        let mut grid = Grid::new(6, 3);
        for y in 0..3 {
            for x in [0, 1, 3, 4] {
                grid.carve(Cell::new(x, y), Cell::new(x + 1, y)).unwrap();
            }
        }
        for x in 0..6 {
            for y in 0..2 {
                grid.carve(Cell::new(x, y), Cell::new(x, y + 1)).unwrap();
            }
        }
        Maze::new(grid, Cell::new(0, 0), Cell::new(5, 2)).unwrap()
    }

    fn heuristic_for(algorithm: Algorithm) -> Option<Heuristic> {
        algorithm.requires_heuristic().then_some(Heuristic::Manhattan)
    }

    #[test]
    fn test_known_shortest_path() {
        let maze = five_by_five();
        for algorithm in Algorithm::ALL {
            let trace = solve_maze(&maze, algorithm, heuristic_for(algorithm));
            assert_eq!(trace.status, SearchStatus::Found, "{algorithm}");
            assert_eq!(trace.path_length(), 8, "{algorithm}");
            assert_eq!(trace.path_cost, 8.0, "{algorithm}");
            assert!(maze.is_valid_path(&trace.path), "{algorithm}");
            assert_eq!(trace.visited_order.len(), trace.node_expansions);
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let maze = five_by_five().with_endpoints(Cell::new(2, 2), Cell::new(2, 2)).unwrap();
        for algorithm in Algorithm::ALL {
            let trace = solve_maze(&maze, algorithm, heuristic_for(algorithm));
            assert_eq!(trace.status, SearchStatus::Found);
            assert_eq!(trace.path, vec![Cell::new(2, 2)]);
            assert_eq!(trace.node_expansions, 0);
            assert_eq!(trace.path_cost, 0.0);
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let maze = disconnected();
        for algorithm in Algorithm::ALL {
            let trace = solve_maze(&maze, algorithm, heuristic_for(algorithm));
            assert_eq!(trace.status, SearchStatus::NoPathFound, "{algorithm}");
            assert!(trace.path.is_empty());
            assert!(trace.node_expansions > 0);
        }
    }

    #[test]
    fn test_repeated_runs_identical() {
        let maze = five_by_five();
        for algorithm in Algorithm::ALL {
            let a = solve_maze(&maze, algorithm, heuristic_for(algorithm));
            let b = solve_maze(&maze, algorithm, heuristic_for(algorithm));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_raised_cancel_flag_interrupts() {
        let maze = five_by_five();
        let cancel = AtomicBool::new(true);
        for algorithm in Algorithm::ALL {
            let trace = solve_maze_until(&maze, algorithm, heuristic_for(algorithm), &cancel);
            assert_eq!(trace.status, SearchStatus::Interrupted, "{algorithm}");
            assert!(trace.path.is_empty());
            assert_eq!(trace.node_expansions, 0);
        }
        // A lowered flag changes nothing
        let cancel = AtomicBool::new(false);
        for algorithm in Algorithm::ALL {
            let h = heuristic_for(algorithm);
            assert_eq!(solve_maze_until(&maze, algorithm, h, &cancel), solve_maze(&maze, algorithm, h));
        }
    }

    #[test]
    fn test_check_heuristic() {
        assert!(Algorithm::Bfs.check_heuristic(None).is_ok());
        assert!(Algorithm::Dijkstra.check_heuristic(Some(Heuristic::Octile)).is_err());
        assert!(Algorithm::AStar.check_heuristic(None).is_err());
        assert!(Algorithm::BidirectionalAStar.check_heuristic(Some(Heuristic::Euclidean)).is_ok());
    }

    #[test]
    fn test_solver_reports_its_algorithm() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.solver().algorithm(), algorithm);
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_diagonal_corridor_needs_eight_connectivity() {
        // Staircase (0,0)->(1,0)->(1,1)->(2,1)->(2,2): 4 moves orthogonally,
        // 2 diagonal moves when 8-connected
        let mut grid = Grid::new(3, 3);
        let stairs: [(u16, u16); 5] = [(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)];
        for w in stairs.windows(2) {
            grid.carve(w[0].into(), w[1].into()).unwrap();
        }
        let four = Maze::new(grid.clone(), Cell::new(0, 0), Cell::new(2, 2)).unwrap();
        let eight = Maze::new(
            grid.with_connectivity(Connectivity::Eight),
            Cell::new(0, 0),
            Cell::new(2, 2),
        )
        .unwrap();

        for algorithm in Algorithm::ALL {
            let h = algorithm.requires_heuristic().then_some(Heuristic::Octile);
            assert_eq!(solve_maze(&four, algorithm, h).path_length(), 4);
            let trace = solve_maze(&eight, algorithm, h);
            assert_eq!(trace.path_length(), 2, "{algorithm}");
            assert!(eight.is_valid_path(&trace.path));
        }
    }
}
