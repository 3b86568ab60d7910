use std::sync::atomic::AtomicBool;

use super::frontier::{Entry, Frontier};
use super::{Algorithm, SearchTrace, Solver, cancelled, reconstruct};
use crate::heuristics::Heuristic;
use crate::maze::{Cell, Grid, Maze};

/// Bidirectional A*: one search from the start toward the goal and one from
/// the goal toward the start, each guided by the heuristic toward its own
/// target.
///
/// Whenever either side relaxes a cell the other side has already reached,
/// the route through that cell becomes a meeting candidate, and the cheapest
/// candidate cost is kept as `best`. The search stops once
///
/// * either frontier is exhausted, or
/// * `max(top_forward, top_backward) >= best`, where the tops are the
///   smallest live `g + h` keys of each side, or
/// * `min_g_forward + min_g_backward >= best`, the smallest live `g` of
///   each side.
///
/// The path is stitched at the meeting cell from the forward parent links and
/// the reversed backward parent links. Step costs are symmetric, so the
/// backward search relaxes edges with the same costs as the forward one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidirectionalAStar;

/// One direction of the search.
struct Side {
    target: Cell,
    g: Vec<f64>,
    /// Cost at which each cell was last expanded, infinite if never.
    expanded_at: Vec<f64>,
    parents: Vec<Option<Cell>>,
    /// Keyed by `g + h(cell, target)`.
    open: Frontier,
    /// Same entries keyed by `g`, to read the smallest open cost.
    by_cost: Frontier,
}

impl Side {
    fn new(grid: &Grid, origin: Cell, target: Cell, origin_estimate: f64) -> Self {
        let mut side = Side {
            target,
            g: vec![f64::INFINITY; grid.len()],
            expanded_at: vec![f64::INFINITY; grid.len()],
            parents: vec![None; grid.len()],
            open: Frontier::new(),
            by_cost: Frontier::new(),
        };
        side.g[grid.index(origin)] = 0.0;
        side.open.push(origin, 0.0, origin_estimate);
        side.by_cost.push(origin, 0.0, 0.0);
        side
    }

    /// An entry is live while it carries the cell's current cost and that
    /// cost has not been expanded yet.
    fn is_live(g: &[f64], expanded_at: &[f64], grid: &Grid, entry: &Entry) -> bool {
        let idx = grid.index(entry.cell);
        entry.g <= g[idx] && expanded_at[idx] != entry.g
    }

    fn top_key(&mut self, grid: &Grid) -> Option<f64> {
        let (g, expanded_at) = (&self.g, &self.expanded_at);
        self.open
            .peek_live(|e| Side::is_live(g, expanded_at, grid, e))
            .map(|e| e.key)
    }

    fn min_g(&mut self, grid: &Grid) -> Option<f64> {
        let (g, expanded_at) = (&self.g, &self.expanded_at);
        self.by_cost
            .peek_live(|e| Side::is_live(g, expanded_at, grid, e))
            .map(|e| e.g)
    }

    fn pop(&mut self, grid: &Grid) -> Option<Entry> {
        let (g, expanded_at) = (&self.g, &self.expanded_at);
        let entry = self
            .open
            .pop_live(|e| Side::is_live(g, expanded_at, grid, e))?;
        self.expanded_at[grid.index(entry.cell)] = entry.g;
        Some(entry)
    }

    fn relax(&mut self, idx: usize, cell: Cell, parent: Cell, cost: f64, estimate: f64) {
        self.g[idx] = cost;
        self.parents[idx] = Some(parent);
        self.open.push(cell, cost, cost + estimate);
        self.by_cost.push(cell, cost, cost);
    }
}

impl Solver for BidirectionalAStar {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BidirectionalAStar
    }

    fn solve_until(&self, maze: &Maze, heuristic: Option<Heuristic>, cancel: &AtomicBool) -> SearchTrace {
        if let Some(trace) = SearchTrace::trivial(maze) {
            return trace;
        }

        let grid = maze.grid();
        let (start, goal) = (maze.start(), maze.goal());
        let estimate = |cell: Cell, target: Cell| heuristic.map_or(0.0, |h| h.estimate(cell, target));

        let mut forward = Side::new(grid, start, goal, estimate(start, goal));
        let mut backward = Side::new(grid, goal, start, estimate(goal, start));
        let mut best = f64::INFINITY;
        let mut meeting: Option<Cell> = None;
        let mut visited_order = Vec::new();

        loop {
            if cancelled(cancel) {
                return SearchTrace::interrupted(visited_order);
            }
            let (Some(top_forward), Some(top_backward)) =
                (forward.top_key(grid), backward.top_key(grid))
            else {
                break;
            };

            if best.is_finite() {
                if top_forward.max(top_backward) >= best {
                    break;
                }
                let floor = forward.min_g(grid).unwrap_or(f64::INFINITY)
                    + backward.min_g(grid).unwrap_or(f64::INFINITY);
                if floor >= best {
                    break;
                }
            }

            // Expand the side with the smaller top key, forward on ties
            let (side, other) = if top_forward <= top_backward {
                (&mut forward, &backward)
            } else {
                (&mut backward, &forward)
            };
            let Some(current) = side.pop(grid) else {
                break;
            };
            visited_order.push(current.cell);

            for neighbor in grid.passable_neighbors(current.cell) {
                let idx = grid.index(neighbor);
                let new_cost = current.g + grid.step_cost(current.cell, neighbor);
                if new_cost < side.g[idx] {
                    let h = estimate(neighbor, side.target);
                    side.relax(idx, neighbor, current.cell, new_cost, h);
                }
                let through = side.g[idx] + other.g[idx];
                if through < best {
                    best = through;
                    meeting = Some(neighbor);
                }
            }
        }

        let Some(meet) = meeting else {
            return SearchTrace::no_path(visited_order);
        };
        tracing::trace!("[bidirectional] searches met at {} with cost {}", meet, best);

        // start..=meet, then meet's backward chain toward the goal
        let mut path = reconstruct(grid, &forward.parents, meet);
        let toward_goal = reconstruct(grid, &backward.parents, meet);
        path.extend(toward_goal.into_iter().rev().skip(1));
        SearchTrace::found(grid, path, visited_order)
    }
}
