//! Journal entry types.

use chrono::{DateTime, Utc};
use dv_core::{Position, StairDirection};
use serde::{Deserialize, Serialize};

/// A single entry in the run journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JournalEntry {
    /// The run began.
    RunStarted {
        /// Character name.
        player: String,
        /// Generation seed.
        seed: u64,
        /// When the run began.
        timestamp: DateTime<Utc>,
    },
    /// The player walked to another room.
    Moved {
        /// Room left.
        from: Position,
        /// Room entered.
        to: Position,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// The player took the stairs.
    StairsTaken {
        /// Which way.
        direction: StairDirection,
        /// The level arrived at.
        new_z: usize,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// The player stayed off the stairs, by answer or by issuing another command.
    StairsDeclined {
        /// Which way the stairs led.
        direction: StairDirection,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A free action was resolved with a roll.
    ActionResolved {
        /// What the player typed.
        text: String,
        /// The action category.
        action_type: String,
        /// The outcome bucket.
        classification: String,
        /// Die result.
        roll: u32,
        /// Roll plus modifier.
        total: i32,
        /// Target number.
        difficulty: u32,
        /// Narration shown to the player.
        narration: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A free action was refused.
    ActionRejected {
        /// What the player typed.
        text: String,
        /// The rejection code.
        reason: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A hazard sprang as the player entered its room.
    HazardSprung {
        /// The hazard's name.
        hazard: String,
        /// Whether the save succeeded.
        avoided: bool,
        /// HP lost.
        damage: u32,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A monster struck at the player.
    MonsterStruck {
        /// The monster's name.
        monster: String,
        /// Whether the strike landed.
        hit: bool,
        /// HP lost.
        damage: u32,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A collaborator failed and a fallback was used.
    CollaboratorFallback {
        /// Which collaborator.
        collaborator: String,
        /// What went wrong.
        cause: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// The game was saved.
    Saved {
        /// File written.
        path: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// A save file was loaded.
    Loaded {
        /// File read.
        path: String,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
    /// The run ended.
    RunEnded {
        /// True if the boss fell, false on death.
        victory: bool,
        /// Turns taken.
        turns: u64,
        /// When it happened.
        timestamp: DateTime<Utc>,
    },
}

impl JournalEntry {
    /// When the entry was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RunStarted { timestamp, .. }
            | Self::Moved { timestamp, .. }
            | Self::StairsTaken { timestamp, .. }
            | Self::StairsDeclined { timestamp, .. }
            | Self::ActionResolved { timestamp, .. }
            | Self::ActionRejected { timestamp, .. }
            | Self::HazardSprung { timestamp, .. }
            | Self::MonsterStruck { timestamp, .. }
            | Self::CollaboratorFallback { timestamp, .. }
            | Self::Saved { timestamp, .. }
            | Self::Loaded { timestamp, .. }
            | Self::RunEnded { timestamp, .. } => *timestamp,
        }
    }
}
