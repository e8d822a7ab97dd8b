//! Error types for the turn engine.

use dv_core::{CoreError, Direction, StairDirection};
use dv_mechanics::MechError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while running a session.
///
/// Rule rejections are not errors; they come back inside an
/// [`ActionReport`](crate::session::ActionReport).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Data-model failure: bounds, configuration, or a corrupt save.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Rules failure: a bad impact table or progression curve.
    #[error(transparent)]
    Mechanics(#[from] MechError),

    /// The dungeon edge blocks the way.
    #[error("you cannot go {direction} from here")]
    NoExit {
        /// The direction attempted.
        direction: Direction,
    },

    /// A stair answer was given with no stair prompt open.
    #[error("there are no stairs waiting for an answer")]
    NoPendingTransition,

    /// Another command arrived while a stair prompt was open. The prompt is
    /// discarded and the command is not executed.
    #[error("you stay off the stairs leading {direction}; the command was not carried out")]
    TransitionDeclined {
        /// The abandoned stair direction.
        direction: StairDirection,
    },

    /// The run has ended, by death or victory.
    #[error("the run is over")]
    GameOver,

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The command could not be understood.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
