//! Dice and injectable roll sources.
//!
//! Every random draw in a resolution goes through [`RollSource`], so tests
//! can script exact outcomes with [`FixedRolls`] while play uses a seeded
//! [`StdRng`](rand::rngs::StdRng).

pub mod source;

pub use source::{FixedRolls, RollSource};

use serde::{Deserialize, Serialize};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Six-sided die; used for hazard and monster damage.
    D6,
    /// Twenty-sided die; used for every check.
    D20,
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D6 => 6,
            Self::D20 => 20,
        }
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}
