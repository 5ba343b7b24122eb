/// Error taxonomy for catalog and server access
use std::time::Duration;
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while talking to the remote catalog or resolving records
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Network or I/O failure reaching the server
    #[error("Transport error: {0}")]
    Transport(String),

    /// A request did not complete within its time budget
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed response, or a response missing mandatory data
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server answered with an error element
    #[error("Server error ({code}): {message}")]
    Server {
        /// Error code reported by the server
        code: String,
        /// Human readable server message
        message: String,
    },

    /// Handshake rejected by the server
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// A catalog call was made before a successful handshake
    #[error("Not connected to a server")]
    NotConnected,

    /// Valid request, but the entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity ("album", "song")
        entity: String,
        /// Requested identifier
        id: String,
    },

    /// Caller-supplied index outside `[0, len)`
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of valid positions
        len: usize,
    },

    /// Configuration is incomplete or invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Whether the failure happened before a valid response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Whether the server reported that the entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
