use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

mod dfs;
mod prim;

use dfs::dfs_backtracker;
use prim::randomized_prim;

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Connectivity, Grid, Maze, Placement};
use crate::rng::MazeRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    DfsBacktracker,
    Prim,
}

impl Generator {
    pub const ALL: [Generator; 2] = [Generator::DfsBacktracker, Generator::Prim];

    /// Stable identifier used in records and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Generator::DfsBacktracker => "dfs_backtracker",
            Generator::Prim => "prim",
        }
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::DfsBacktracker => write!(f, "Depth-First Search Backtracker"),
            Generator::Prim => write!(f, "Randomized Prim's Algorithm"),
        }
    }
}

impl std::str::FromStr for Generator {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        Generator::ALL
            .into_iter()
            .find(|g| g.name() == s)
            .ok_or_else(|| MazeError::invalid(format!("unknown generator '{s}'")))
    }
}

/// Maze-level choices that do not affect carving.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub connectivity: Connectivity,
    pub placement: Placement,
}

/// Draws the root cell both generators carve from.
fn random_cell(grid: &Grid, rng: &mut MazeRng) -> Cell {
    Cell::new(
        rng.next_int(grid.width() as usize) as u16,
        rng.next_int(grid.height() as usize) as u16,
    )
}

/// Carves a spanning tree into a blank `width` x `height` grid.
///
/// The result is checked before returning: every cell must be reachable from
/// the root and exactly `width * height - 1` passages must be open.
pub fn generate_grid(
    generator: Generator,
    width: u16,
    height: u16,
    rng: &mut MazeRng,
) -> Result<Grid> {
    generate_grid_until(generator, width, height, rng, &AtomicBool::new(false))
}

/// Like [`generate_grid`], but stops with [`MazeError::Interrupted`] once
/// `cancel` is raised.
pub fn generate_grid_until(
    generator: Generator,
    width: u16,
    height: u16,
    rng: &mut MazeRng,
    cancel: &AtomicBool,
) -> Result<Grid> {
    if width == 0 || height == 0 {
        return Err(MazeError::invalid(format!(
            "maze dimensions must be positive, got {width}x{height}"
        )));
    }

    let mut grid = Grid::new(width, height);
    let root = random_cell(&grid, rng);
    match generator {
        Generator::DfsBacktracker => dfs_backtracker(&mut grid, root, rng, cancel)?,
        Generator::Prim => randomized_prim(&mut grid, root, rng, cancel)?,
    }

    verify_spanning_tree(&grid, root).map_err(|reason| MazeError::Generation {
        generator,
        width,
        height,
        reason,
    })?;
    tracing::debug!(
        "[generate] {} carved {}x{} from root {}",
        generator.name(),
        width,
        height,
        root
    );
    Ok(grid)
}

/// Generates a grid and places start and goal on it.
///
/// `rng` drives carving; `placement_rng` is only consumed by [`Placement::Random`].
pub fn generate_maze(
    generator: Generator,
    width: u16,
    height: u16,
    rng: &mut MazeRng,
    placement_rng: &mut MazeRng,
    options: GenerateOptions,
) -> Result<Maze> {
    generate_maze_until(generator, width, height, rng, placement_rng, options, &AtomicBool::new(false))
}

pub fn generate_maze_until(
    generator: Generator,
    width: u16,
    height: u16,
    rng: &mut MazeRng,
    placement_rng: &mut MazeRng,
    options: GenerateOptions,
    cancel: &AtomicBool,
) -> Result<Maze> {
    let grid = generate_grid_until(generator, width, height, rng, cancel)?
        .with_connectivity(options.connectivity);
    let (start, goal) = options.placement.place(width, height, placement_rng);
    Maze::new(grid, start, goal)
}

fn verify_spanning_tree(grid: &Grid, root: Cell) -> std::result::Result<(), String> {
    let cells = grid.len();
    let reached = grid.reachable_count(root);
    if reached != cells {
        return Err(format!("only {reached} of {cells} cells are reachable"));
    }
    let passages = grid.passage_count();
    if passages != cells - 1 {
        return Err(format!(
            "expected {} passages for a spanning tree, found {passages}",
            cells - 1
        ));
    }
    Ok(())
}
