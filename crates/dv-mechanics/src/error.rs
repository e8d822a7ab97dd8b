//! Error types for the rules crate.

/// Errors that can occur while building or running the rules.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A collaborator response could not be read as an action intent.
    #[error("malformed intent: {0}")]
    MalformedIntent(String),

    /// An impact table breaks the shape rules for its outcome buckets.
    #[error("invalid impact table: {0}")]
    InvalidTable(String),
}

/// Convenience result type for rules operations.
pub type MechResult<T> = Result<T, MechError>;
