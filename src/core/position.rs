//! Grid coordinates.
//!
//! Movement on the map is 4-connected (`neighbours`), but units standing on
//! any of the 8 surrounding cells (`all_neighbours`) are in contact range.
//! Both enumerations use a fixed order so tie-breaks are reproducible.

use serde::{Deserialize, Serialize};

/// Integer `(x, y)` cell on the game map.
///
/// `x` grows to the east, `y` grows to the south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The 4-connected neighbours in fixed order: N, E, S, W.
    ///
    /// No bounds checking; callers filter against the map.
    #[must_use]
    pub const fn neighbours(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x - 1, self.y),
        ]
    }

    /// The 8 surrounding cells, row by row from the north-west corner.
    #[must_use]
    pub const fn all_neighbours(self) -> [Position; 8] {
        let (x, y) = (self.x, self.y);
        [
            Position::new(x - 1, y - 1),
            Position::new(x, y - 1),
            Position::new(x + 1, y - 1),
            Position::new(x - 1, y),
            Position::new(x + 1, y),
            Position::new(x - 1, y + 1),
            Position::new(x, y + 1),
            Position::new(x + 1, y + 1),
        ]
    }

    /// Straight-line distance.
    #[must_use]
    pub fn euclidean(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Step distance on a 4-connected grid.
    #[must_use]
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Step distance when diagonal contact counts as adjacent.
    #[must_use]
    pub fn chebyshev(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// True if `other` shares an edge with this cell.
    #[must_use]
    pub fn is_orthogonally_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
