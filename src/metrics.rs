//! Per-solve records and batch tallies.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::generators::Generator;
use crate::heuristics::Heuristic;
use crate::maze::{Cell, Connectivity, Maze};
use crate::solvers::{Algorithm, SearchStatus, SearchTrace, solve_maze_until};

/// Identifies one trial independently of its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub generator: Generator,
    pub algorithm: Algorithm,
    pub heuristic: Option<Heuristic>,
    pub width: u16,
    pub height: u16,
    pub seed: u64,
    pub trial_index: u32,
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.generator.name(),
            self.algorithm.name()
        )?;
        if let Some(h) = self.heuristic {
            write!(f, "/{}", h.name())?;
        }
        write!(
            f,
            " {}x{} trial {} seed {}",
            self.width, self.height, self.trial_index, self.seed
        )
    }
}

/// The outcome of one solve, immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub generator: Generator,
    pub algorithm: Algorithm,
    pub heuristic: Option<Heuristic>,
    pub connectivity: Connectivity,
    pub width: u16,
    pub height: u16,
    pub seed: u64,
    pub trial_index: u32,
    pub status: SearchStatus,
    /// Moves in `path`, 0 when it is empty.
    pub path_length: usize,
    pub path_cost: f64,
    pub node_expansions: usize,
    /// Wall-clock time of the solve call alone.
    pub runtime_ms: f64,
    pub start: Cell,
    pub goal: Cell,
    pub path: Vec<Cell>,
    pub visited_order: Vec<Cell>,
}

impl SearchResult {
    pub fn new(spec: &TrialSpec, maze: &Maze, trace: SearchTrace, runtime_ms: f64) -> Self {
        SearchResult {
            generator: spec.generator,
            algorithm: spec.algorithm,
            heuristic: spec.heuristic,
            connectivity: maze.grid().connectivity(),
            width: maze.width(),
            height: maze.height(),
            seed: spec.seed,
            trial_index: spec.trial_index,
            status: trace.status,
            path_length: trace.path_length(),
            path_cost: trace.path_cost,
            node_expansions: trace.node_expansions,
            runtime_ms,
            start: maze.start(),
            goal: maze.goal(),
            path: trace.path,
            visited_order: trace.visited_order,
        }
    }

    /// The set of expanded cells.
    pub fn visited(&self) -> HashSet<Cell> {
        self.visited_order.iter().copied().collect()
    }

    /// Equality on everything except `runtime_ms`.
    pub fn same_outcome(&self, other: &SearchResult) -> bool {
        let SearchResult {
            generator,
            algorithm,
            heuristic,
            connectivity,
            width,
            height,
            seed,
            trial_index,
            status,
            path_length,
            path_cost,
            node_expansions,
            runtime_ms: _,
            start,
            goal,
            path,
            visited_order,
        } = self;
        *generator == other.generator
            && *algorithm == other.algorithm
            && *heuristic == other.heuristic
            && *connectivity == other.connectivity
            && *width == other.width
            && *height == other.height
            && *seed == other.seed
            && *trial_index == other.trial_index
            && *status == other.status
            && *path_length == other.path_length
            && *path_cost == other.path_cost
            && *node_expansions == other.node_expansions
            && *start == other.start
            && *goal == other.goal
            && *path == other.path
            && *visited_order == other.visited_order
    }
}

/// One line of experiment output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrialRecord {
    Solved(SearchResult),
    Failed { trial: TrialSpec, error: String },
    TimedOut { trial: TrialSpec, budget_ms: u64 },
}

impl TrialRecord {
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            TrialRecord::Solved(result) => Some(result),
            _ => None,
        }
    }
}

/// Counts of trial outcomes over a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Solved trials that found a path.
    pub solved: usize,
    /// Solved trials that proved no path exists.
    pub no_path: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn tally(&mut self, record: &TrialRecord) {
        self.total += 1;
        match record {
            TrialRecord::Solved(result) => match result.status {
                SearchStatus::Found => self.solved += 1,
                SearchStatus::NoPathFound => self.no_path += 1,
                SearchStatus::Interrupted => self.timed_out += 1,
            },
            TrialRecord::Failed { .. } => self.failed += 1,
            TrialRecord::TimedOut { .. } => self.timed_out += 1,
        }
    }
}

impl<'a> FromIterator<&'a TrialRecord> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a TrialRecord>>(records: I) -> Self {
        let mut summary = RunSummary::default();
        for record in records {
            summary.tally(record);
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trials: {} solved, {} without path, {} failed, {} timed out",
            self.total, self.solved, self.no_path, self.failed, self.timed_out
        )
    }
}

/// Runs the solver and measures only the solve call, in milliseconds.
pub fn solve_timed(
    maze: &Maze,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
) -> (SearchTrace, f64) {
    solve_timed_until(maze, algorithm, heuristic, &AtomicBool::new(false))
}

/// [`solve_timed`] with a cancel flag handed to the solver.
pub fn solve_timed_until(
    maze: &Maze,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
    cancel: &AtomicBool,
) -> (SearchTrace, f64) {
    let started = Instant::now();
    let trace = solve_maze_until(maze, algorithm, heuristic, cancel);
    let runtime_ms = started.elapsed().as_secs_f64() * 1000.0;
    (trace, runtime_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Grid;

    fn corridor() -> Maze {
        let mut grid = Grid::new(3, 1);
        grid.carve(Cell::new(0, 0), Cell::new(1, 0)).unwrap();
        grid.carve(Cell::new(1, 0), Cell::new(2, 0)).unwrap();
        Maze::new(grid, Cell::new(0, 0), Cell::new(2, 0)).unwrap()
    }

    fn spec(algorithm: Algorithm) -> TrialSpec {
        TrialSpec {
            generator: Generator::Prim,
            algorithm,
            heuristic: algorithm.requires_heuristic().then_some(Heuristic::Manhattan),
            width: 3,
            height: 1,
            seed: 42,
            trial_index: 3,
        }
    }

    fn solved(algorithm: Algorithm) -> SearchResult {
        let maze = corridor();
        let spec = spec(algorithm);
        let (trace, runtime_ms) = solve_timed(&maze, algorithm, spec.heuristic);
        SearchResult::new(&spec, &maze, trace, runtime_ms)
    }

    #[test]
    fn test_result_from_trace() {
        let result = solved(Algorithm::Bfs);
        assert_eq!(result.path_length, 2);
        assert_eq!(result.path_cost, 2.0);
        assert_eq!(result.start, Cell::new(0, 0));
        assert_eq!(result.trial_index, 3);
        assert_eq!(result.connectivity, Connectivity::Four);
        assert!(result.runtime_ms >= 0.0);
        assert_eq!(result.visited(), HashSet::from([Cell::new(0, 0), Cell::new(1, 0)]));
    }

    #[test]
    fn test_same_outcome_ignores_runtime() {
        let a = solved(Algorithm::AStar);
        let mut b = a.clone();
        b.runtime_ms += 12.5;
        assert!(a.same_outcome(&b));
        b.node_expansions += 1;
        assert!(!a.same_outcome(&b));
        let mut c = a.clone();
        c.trial_index += 1;
        assert!(!a.same_outcome(&c));
    }

    #[test]
    fn test_record_json_shape() {
        let record = TrialRecord::Solved(solved(Algorithm::AStar));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["outcome"], "solved");
        assert_eq!(value["algorithm"], "a_star");
        assert_eq!(value["heuristic"], "manhattan");
        assert_eq!(value["status"], "found");
        assert_eq!(value["trial_index"], 3);
        assert_eq!(value["start"], serde_json::json!([0, 0]));
        assert_eq!(value["path"], serde_json::json!([[0, 0], [1, 0], [2, 0]]));

        let failed = TrialRecord::Failed {
            trial: spec(Algorithm::Bfs),
            error: "boom".to_string(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["trial"]["heuristic"], serde_json::Value::Null);
        assert_eq!(value["error"], "boom");
    }

    #[test]
    fn test_record_parses_back() {
        let record = TrialRecord::TimedOut {
            trial: spec(Algorithm::Dijkstra),
            budget_ms: 250,
        };
        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<TrialRecord>(&line).unwrap(), record);
    }

    #[test]
    fn test_summary_tally() {
        let mut no_path = solved(Algorithm::Bfs);
        no_path.status = SearchStatus::NoPathFound;
        let mut interrupted = solved(Algorithm::Bfs);
        interrupted.status = SearchStatus::Interrupted;
        let records = [
            TrialRecord::Solved(solved(Algorithm::Bfs)),
            TrialRecord::Solved(no_path),
            TrialRecord::Solved(interrupted),
            TrialRecord::Failed {
                trial: spec(Algorithm::Bfs),
                error: String::new(),
            },
            TrialRecord::TimedOut {
                trial: spec(Algorithm::Bfs),
                budget_ms: 1,
            },
        ];
        let summary: RunSummary = records.iter().collect();
        assert_eq!(
            summary,
            RunSummary {
                solved: 1,
                no_path: 1,
                failed: 1,
                timed_out: 2,
                total: 5
            }
        );
        assert_eq!(
            summary.to_string(),
            "5 trials: 1 solved, 1 without path, 1 failed, 2 timed out"
        );
    }
}
