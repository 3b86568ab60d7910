use std::sync::atomic::AtomicBool;

use super::dijkstra::best_first;
use super::{Algorithm, SearchTrace, Solver};
use crate::heuristics::Heuristic;
use crate::maze::Maze;

/// A* search keyed by `g + h(cell, goal)`.
///
/// Cells are reopened when a cheaper route to them turns up, so the result
/// stays optimal for admissible heuristics even if they are not consistent.
/// Without a heuristic the search degrades to Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl Solver for AStar {
    fn algorithm(&self) -> Algorithm {
        Algorithm::AStar
    }

    fn solve_until(&self, maze: &Maze, heuristic: Option<Heuristic>, cancel: &AtomicBool) -> SearchTrace {
        let goal = maze.goal();
        best_first(maze, |cell| heuristic.map_or(0.0, |h| h.estimate(cell, goal)), cancel)
    }
}
