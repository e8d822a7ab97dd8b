use serde::{Deserialize, Serialize};

/// A room address: column `x`, row `y`, and level `z` (0 is the top level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing east.
    pub x: usize,
    /// Row, growing south.
    pub y: usize,
    /// Level, growing deeper.
    pub z: usize,
}

impl Position {
    /// Create a position from its three coordinates.
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// The starting room of every run.
    pub fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// The neighbouring position one step in `direction` on the same level.
    ///
    /// Returns `None` when the step would go below zero. The upper edge is
    /// the dungeon's concern, see [`crate::Dungeon::get_exits`].
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (x, y) = match direction {
            Direction::North => (Some(self.x), self.y.checked_sub(1)),
            Direction::South => (Some(self.x), self.y.checked_add(1)),
            Direction::East => (self.x.checked_add(1), Some(self.y)),
            Direction::West => (self.x.checked_sub(1), Some(self.y)),
        };
        Some(Self::new(x?, y?, self.z))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A cardinal direction on one level. Levels are only connected by stairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards `y - 1`.
    North,
    /// Towards `y + 1`.
    South,
    /// Towards `x + 1`.
    East,
    /// Towards `x - 1`.
    West,
}

impl Direction {
    /// All four directions in a stable order.
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Parse a direction from a word or its initial letter.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" => Some(Self::North),
            "s" | "south" => Some(Self::South),
            "e" | "east" => Some(Self::East),
            "w" | "west" => Some(Self::West),
            _ => None,
        }
    }

    /// Get the display name for this direction.
    pub fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
