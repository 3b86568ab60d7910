use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Grid};
use crate::rng::MazeRng;

/// Iterative depth-first backtracker.
///
/// The stack holds the current carving trail. At each step the unvisited
/// orthogonal neighbors of the top cell are shuffled and the first one is
/// carved to; a dead end pops the stack.
pub fn dfs_backtracker(grid: &mut Grid, root: Cell, rng: &mut MazeRng, cancel: &AtomicBool) -> Result<()> {
    if grid.is_empty() {
        return Ok(());
    }

    let mut visited = vec![false; grid.len()];
    visited[grid.index(root)] = true;
    let mut stack = vec![root];

    while let Some(&cell) = stack.last() {
        if cancel.load(Ordering::Relaxed) {
            return Err(MazeError::Interrupted);
        }
        let mut unvisited = grid
            .orthogonal_neighbors(cell)
            .filter(|&n| !visited[grid.index(n)])
            .collect::<Vec<_>>();

        if unvisited.is_empty() {
            stack.pop();
            continue;
        }

        rng.shuffle(&mut unvisited);
        let next = unvisited[0];
        grid.carve(cell, next)?;
        visited[grid.index(next)] = true;
        // Push the neighbor to carve the maze in its direction
        stack.push(next);
    }
    Ok(())
}
