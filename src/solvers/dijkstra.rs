use std::sync::atomic::AtomicBool;

use super::frontier::Frontier;
use super::{Algorithm, SearchTrace, Solver, cancelled, reconstruct};
use crate::heuristics::Heuristic;
use crate::maze::{Cell, Maze};

/// Dijkstra's algorithm over the grid's step costs.
///
/// Under unit costs it explores like BFS; weighted cells (see
/// [`crate::maze::Grid::set_cost`]) are honored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl Solver for Dijkstra {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dijkstra
    }

    fn solve_until(&self, maze: &Maze, _heuristic: Option<Heuristic>, cancel: &AtomicBool) -> SearchTrace {
        best_first(maze, |_| 0.0, cancel)
    }
}

/// Best-first search keyed by `g + estimate(cell)`, terminating when the goal
/// is popped.
///
/// Outdated frontier entries are skipped when popped, and a cell is expanded
/// again whenever a strictly cheaper `g` is found for it.
pub(super) fn best_first(maze: &Maze, estimate: impl Fn(Cell) -> f64, cancel: &AtomicBool) -> SearchTrace {
    if let Some(trace) = SearchTrace::trivial(maze) {
        return trace;
    }

    let grid = maze.grid();
    let (start, goal) = (maze.start(), maze.goal());
    let mut g = vec![f64::INFINITY; grid.len()];
    let mut parents: Vec<Option<Cell>> = vec![None; grid.len()];
    let mut visited_order = Vec::new();
    let mut frontier = Frontier::new();

    g[grid.index(start)] = 0.0;
    frontier.push(start, 0.0, estimate(start));

    while let Some(current) = frontier.pop_live(|e| e.g <= g[grid.index(e.cell)]) {
        if current.cell == goal {
            let path = reconstruct(grid, &parents, goal);
            return SearchTrace::found(grid, path, visited_order);
        }
        if cancelled(cancel) {
            return SearchTrace::interrupted(visited_order);
        }

        visited_order.push(current.cell);
        for neighbor in grid.passable_neighbors(current.cell) {
            let idx = grid.index(neighbor);
            let new_cost = current.g + grid.step_cost(current.cell, neighbor);
            // Only consider neighbors that we can reach with a lower cost
            if new_cost < g[idx] {
                g[idx] = new_cost;
                parents[idx] = Some(current.cell);
                frontier.push(neighbor, new_cost, new_cost + estimate(neighbor));
            }
        }
    }

    SearchTrace::no_path(visited_order)
}
