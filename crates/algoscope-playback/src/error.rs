//! Error types for playback.

use thiserror::Error;

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Errors raised when building a playback controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// There is nothing to play.
    #[error("cannot play an empty step log")]
    EmptyLog,

    /// Checkpoints must be taken at least every step.
    #[error("checkpoint interval must be at least 1, got {0}")]
    InvalidCheckpointInterval(usize),
}
