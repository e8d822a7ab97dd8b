//! Turn engine for Delve.
//!
//! A [`GameSession`] runs one dungeon crawl: it moves the player, drives the
//! stair confirmation prompt, and sends each free-text action through the
//! interpret, validate, resolve, apply, and narrate pipeline. The two text
//! collaborators are called behind a timeout and replaced by offline
//! fallbacks whenever they fail. Runs can be saved, reloaded, and exported
//! as a journal.

/// Contracts and offline implementations for the text collaborators.
pub mod collaborator;
/// Engine configuration.
pub mod config;
/// Error types for the engine.
pub mod error;
/// Chronological run journal.
pub mod journal;
/// The game session and command processing.
pub mod session;
/// The stair confirmation state machine.
pub mod stairs;

/// Re-export collaborator types.
pub use collaborator::{
    CollaboratorError, Guarded, IntentExtractor, IntentRequest, KeywordInterpreter,
    NarrationRequest, Narrator, NarratorTone, PlayerView, RoomView, TemplateNarrator,
};
/// Re-export configuration.
pub use config::EngineConfig;
/// Re-export error types.
pub use error::{EngineError, EngineResult};
/// Re-export journal types.
pub use journal::{Journal, JournalEntry};
/// Re-export session types.
pub use session::{
    ActionReport, GameSession, MoveOutcome, RunStatus, TransitionOutcome, default_player,
};
/// Re-export the stair machine.
pub use stairs::{StairMachine, StairState};
