use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Grid};
use crate::rng::MazeRng;

/// Randomized Prim's algorithm over cells.
///
/// The frontier holds un-carved cells adjacent to the carved region. A frontier
/// cell is picked uniformly, joined to a uniformly chosen carved neighbor, and
/// its own un-carved neighbors join the frontier.
pub fn randomized_prim(grid: &mut Grid, root: Cell, rng: &mut MazeRng, cancel: &AtomicBool) -> Result<()> {
    if grid.is_empty() {
        return Ok(());
    }

    let mut carved = vec![false; grid.len()];
    let mut in_frontier = vec![false; grid.len()];
    let mut frontier: Vec<Cell> = Vec::new();

    carved[grid.index(root)] = true;
    for n in grid.orthogonal_neighbors(root) {
        in_frontier[grid.index(n)] = true;
        frontier.push(n);
    }

    while !frontier.is_empty() {
        if cancel.load(Ordering::Relaxed) {
            return Err(MazeError::Interrupted);
        }
        // Randomly select a cell from the frontier
        let idx = rng.next_int(frontier.len());
        let cell = frontier.swap_remove(idx);

        let carved_neighbors = grid
            .orthogonal_neighbors(cell)
            .filter(|&n| carved[grid.index(n)])
            .collect::<Vec<_>>();
        let Some(&neighbor) = rng.choose(&carved_neighbors) else {
            // Frontier cells always touch the carved region
            continue;
        };

        grid.carve(cell, neighbor)?;
        carved[grid.index(cell)] = true;

        let fresh = grid
            .orthogonal_neighbors(cell)
            .filter(|&n| !carved[grid.index(n)] && !in_frontier[grid.index(n)])
            .collect::<Vec<_>>();
        for n in fresh {
            in_frontier[grid.index(n)] = true;
            frontier.push(n);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomized_prim_spanning_tree() {
        let mut grid = Grid::new(7, 7);
        randomized_prim(&mut grid, Cell::new(3, 3), &mut MazeRng::new(0), &AtomicBool::new(false)).unwrap();
        assert_eq!(grid.passage_count(), 48);
        assert!(grid.is_connected());
    }

    #[test]
    fn test_randomized_prim_single_cell() {
        let mut grid = Grid::new(1, 1);
        randomized_prim(&mut grid, Cell::new(0, 0), &mut MazeRng::new(0), &AtomicBool::new(false)).unwrap();
        assert_eq!(grid.passage_count(), 0);
    }
}
