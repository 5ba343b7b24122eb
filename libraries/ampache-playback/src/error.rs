//! Error types for playback

use crate::types::EngineState;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The media backend failed to load, prepare or start a stream
    #[error("Media backend error: {0}")]
    Backend(String),

    /// Operation not allowed in the engine's current state
    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        /// Engine state at the time of the call
        state: EngineState,
        /// Rejected operation
        operation: &'static str,
    },

    /// Playlist index outside `[0, len)`
    #[error("Track index {index} out of range (playlist has {len} entries)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Playlist length
        len: usize,
    },

    /// The controller worker has shut down
    #[error("Playback worker is not running")]
    WorkerUnavailable,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
