//! Distance estimates for the informed solvers.
//!
//! A heuristic is only a lower bound for the movement model it is paired with:
//! Manhattan overestimates diagonal moves and must not be used on 8-connected
//! grids. Callers pick the pairing; [`Heuristic::admissible_for`] reports it.

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Connectivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    Manhattan,
    Euclidean,
    Octile,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [Heuristic::Manhattan, Heuristic::Euclidean, Heuristic::Octile];

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::Octile => "octile",
        }
    }

    /// Estimated remaining cost from `cell` to `goal`. Never negative.
    pub fn estimate(self, cell: Cell, goal: Cell) -> f64 {
        let (dx, dy) = cell.abs_diff(goal);
        let (dx, dy) = (dx as f64, dy as f64);
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
            Heuristic::Octile => {
                dx.max(dy) + (std::f64::consts::SQRT_2 - 1.0) * dx.min(dy)
            }
        }
    }

    /// Whether the estimate never exceeds the true cost under `connectivity`
    /// with unit orthogonal and √2 diagonal steps.
    pub fn admissible_for(self, connectivity: Connectivity) -> bool {
        match self {
            Heuristic::Manhattan => connectivity == Connectivity::Four,
            Heuristic::Euclidean | Heuristic::Octile => true,
        }
    }

    /// Fails with `InvalidConfiguration` when the pairing voids optimality.
    pub fn check_admissible(self, connectivity: Connectivity) -> Result<()> {
        if self.admissible_for(connectivity) {
            Ok(())
        } else {
            Err(MazeError::invalid(format!(
                "{} heuristic is not admissible on {connectivity} grids",
                self.name()
            )))
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Heuristic {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        Heuristic::ALL
            .into_iter()
            .find(|h| h.name() == s)
            .ok_or_else(|| MazeError::invalid(format!("unknown heuristic '{s}'")))
    }
}
