use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;

use super::{Algorithm, SearchTrace, Solver, cancelled, reconstruct};
use crate::heuristics::Heuristic;
use crate::maze::Maze;

/// Breadth-first search. Every move counts as one step regardless of cell
/// costs, so the path is shortest in moves. The search stops as soon as the
/// goal is discovered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bfs;

impl Solver for Bfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
    }

    fn solve_until(&self, maze: &Maze, _heuristic: Option<Heuristic>, cancel: &AtomicBool) -> SearchTrace {
        if let Some(trace) = SearchTrace::trivial(maze) {
            return trace;
        }

        let grid = maze.grid();
        let (start, goal) = (maze.start(), maze.goal());
        let mut parents = vec![None; grid.len()];
        let mut discovered = vec![false; grid.len()];
        let mut visited_order = Vec::new();
        let mut queue = VecDeque::from([start]);
        discovered[grid.index(start)] = true;

        while let Some(cell) = queue.pop_front() {
            if cancelled(cancel) {
                return SearchTrace::interrupted(visited_order);
            }
            visited_order.push(cell);
            for neighbor in grid.passable_neighbors(cell) {
                let idx = grid.index(neighbor);
                if discovered[idx] {
                    continue;
                }
                discovered[idx] = true;
                parents[idx] = Some(cell);
                if neighbor == goal {
                    let path = reconstruct(grid, &parents, goal);
                    return SearchTrace::found(grid, path, visited_order);
                }
                queue.push_back(neighbor);
            }
        }

        SearchTrace::no_path(visited_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Cell, Grid};

    #[test]
    fn test_bfs_expansion_order_is_fifo() {
        // Start in the middle of the top row, goal below its east end
        let mut grid = Grid::new(3, 2);
        let passages: [((u16, u16), (u16, u16)); 4] =
            [((0, 0), (1, 0)), ((1, 0), (2, 0)), ((2, 0), (2, 1)), ((0, 0), (0, 1))];
        for (a, b) in passages {
            grid.carve(a.into(), b.into()).unwrap();
        }
        let maze = Maze::new(grid, Cell::new(1, 0), Cell::new(2, 1)).unwrap();
        let trace = Bfs.solve(&maze, None);
        assert_eq!(trace.path, vec![Cell::new(1, 0), Cell::new(2, 0), Cell::new(2, 1)]);
        // E is enumerated before W, so (2,0) is expanded before (0,0)
        assert_eq!(trace.visited_order, vec![Cell::new(1, 0), Cell::new(2, 0)]);
        assert_eq!(trace.node_expansions, 2);
    }

    #[test]
    fn test_bfs_ignores_cell_costs() {
        let mut grid = Grid::new(2, 2);
        let passages: [((u16, u16), (u16, u16)); 4] =
            [((0, 0), (1, 0)), ((1, 0), (1, 1)), ((0, 0), (0, 1)), ((0, 1), (1, 1))];
        for (a, b) in passages {
            grid.carve(a.into(), b.into()).unwrap();
        }
        grid.set_cost(Cell::new(1, 0), 10.0).unwrap();
        let maze = Maze::new(grid, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let trace = Bfs.solve(&maze, None);
        // East is enumerated before south, so the expensive route is taken
        assert_eq!(trace.path[1], Cell::new(1, 0));
        assert_eq!(trace.path_cost, 5.5 + 5.5);
    }
}
