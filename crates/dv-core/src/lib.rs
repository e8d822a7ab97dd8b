//! Core types for Delve: the dungeon grid, rooms, items, the player, and quests.
//!
//! This crate is pure data plus queries. It has no notion of turns or dice;
//! the rules live in `dv-mechanics` and the turn pipeline in `dv-engine`.
//! Every type here round-trips through serde without loss, and
//! [`save`] wraps a complete snapshot in an integrity-checked envelope.

/// Grid coordinates and cardinal directions.
pub mod coord;
/// The multi-level dungeon grid and its queries.
pub mod dungeon;
/// Error types used throughout the crate.
pub mod error;
/// Randomized dungeon generation.
pub mod generate;
/// Items, equipment slots, and capability flags.
pub mod item;
/// The player character.
pub mod player;
/// Quests and objective progress.
pub mod quest;
/// Rooms and their occupants.
pub mod room;
/// Save-file snapshots with integrity checking.
pub mod save;

/// Re-export coordinate types.
pub use coord::{Direction, Position};
/// Re-export the dungeon model.
pub use dungeon::{Dungeon, StairDirection};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export generation configuration.
pub use generate::DungeonConfig;
/// Re-export item types.
pub use item::{Capability, EquipSlot, Item, ItemId, ItemKind};
/// Re-export player types.
pub use player::{Attribute, Attributes, Player};
/// Re-export quest types.
pub use quest::{ObjectiveKind, Quest, QuestLog, QuestObjective, QuestReward};
/// Re-export room types.
pub use room::{Monster, Npc, Room, RoomType};
/// Re-export save-file types.
pub use save::{GameSnapshot, SaveFile};
