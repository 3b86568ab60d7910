use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid position. Identity is positional; cells are only referenced by coordinate.
///
/// Cells order row-major (`y` first, then `x`), which is the coordinate
/// tie-break used by the priority frontiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u16, u16)", into = "(u16, u16)")]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

impl Cell {
    pub const fn new(x: u16, y: u16) -> Self {
        Cell { x, y }
    }

    /// The cell one step in `direction`, or `None` on coordinate underflow/overflow.
    /// Bounds against a grid are checked by the grid.
    pub fn step(self, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Cell { x, y })
    }

    /// Absolute coordinate differences to `other`.
    pub fn abs_diff(self, other: Cell) -> (u16, u16) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Whether `other` is one orthogonal step away.
    pub fn is_orthogonal_to(self, other: Cell) -> bool {
        matches!(self.abs_diff(other), (1, 0) | (0, 1))
    }

    /// Whether `other` is one diagonal step away.
    pub fn is_diagonal_to(self, other: Cell) -> bool {
        self.abs_diff(other) == (1, 1)
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(u16, u16)> for Cell {
    fn from((x, y): (u16, u16)) -> Self {
        Cell { x, y }
    }
}

impl From<Cell> for (u16, u16) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement directions. `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl Direction {
    /// Orthogonal directions in their fixed enumeration order.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Diagonal directions, enumerated after the orthogonal ones.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Orthogonal then diagonal directions.
    pub const ALL: [Direction; 8] = {
        let (o, d) = (Direction::ORTHOGONAL, Direction::DIAGONAL);
        [o[0], o[1], o[2], o[3], d[0], d[1], d[2], d[3]]
    };

    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

/// Movement model of a grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Orthogonal moves only.
    #[default]
    Four,
    /// Orthogonal and diagonal moves; a diagonal costs √2.
    Eight,
}

impl Connectivity {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Connectivity::Four => &Direction::ORTHOGONAL,
            Connectivity::Eight => &Direction::ALL,
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Four => write!(f, "4-connected"),
            Connectivity::Eight => write!(f, "8-connected"),
        }
    }
}

impl std::str::FromStr for Connectivity {
    type Err = crate::error::MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4" | "four" => Ok(Connectivity::Four),
            "8" | "eight" => Ok(Connectivity::Eight),
            _ => Err(crate::error::MazeError::invalid(format!(
                "unknown connectivity '{s}', expected 4 or 8"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connectivity() {
        assert_eq!("8".parse::<Connectivity>().unwrap(), Connectivity::Eight);
        assert_eq!("four".parse::<Connectivity>().unwrap(), Connectivity::Four);
        assert!("6".parse::<Connectivity>().is_err());
    }

    #[test]
    fn test_step_guards_underflow() {
        let origin = Cell::new(0, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::SouthEast), Some(Cell::new(1, 1)));
        assert_eq!(Cell::new(u16::MAX, 3).step(Direction::East), None);
    }

    #[test]
    fn test_row_major_order() {
        let mut cells = vec![Cell::new(2, 0), Cell::new(0, 1), Cell::new(1, 0)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(1, 0), Cell::new(2, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_adjacency_kinds() {
        let c = Cell::new(3, 3);
        assert!(c.is_orthogonal_to(Cell::new(3, 4)));
        assert!(!c.is_orthogonal_to(Cell::new(4, 4)));
        assert!(c.is_diagonal_to(Cell::new(2, 2)));
        assert!(!c.is_diagonal_to(Cell::new(3, 3)));
    }

    #[test]
    fn test_direction_order() {
        assert_eq!(Connectivity::Four.directions(), &Direction::ORTHOGONAL);
        let eight = Connectivity::Eight.directions();
        assert_eq!(&eight[..4], &Direction::ORTHOGONAL);
        assert_eq!(&eight[4..], &Direction::DIAGONAL);
        for d in Direction::DIAGONAL {
            let (dx, dy) = d.delta();
            assert!(dx != 0 && dy != 0, "{d:?}");
        }
    }

    #[test]
    fn test_serializes_as_pair() {
        let json = serde_json::to_string(&Cell::new(4, 7)).unwrap();
        assert_eq!(json, "[4,7]");
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Cell::new(4, 7));
    }
}
