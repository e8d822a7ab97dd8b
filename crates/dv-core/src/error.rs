use crate::coord::Position;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or querying game state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A coordinate lies outside the dungeon's `size` × `size` × `num_levels` range.
    #[error("coordinate {position} is outside the dungeon (size {size}, {num_levels} levels)")]
    OutOfBounds {
        /// The offending coordinate.
        position: Position,
        /// Grid width and height.
        size: usize,
        /// Number of levels.
        num_levels: usize,
    },

    /// A dungeon or player configuration value is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A save file failed its integrity or version check.
    #[error("save file is corrupt: {0}")]
    StateCorruption(String),

    /// A snapshot could not be encoded or decoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
