use serde::{Deserialize, Serialize};

/// Outcome of a successful handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Bearer token sent with every subsequent request
    pub token: String,
    pub album_count: usize,
    pub artist_count: usize,
    pub song_count: usize,
    /// API version reported by the server (if any)
    pub api_version: Option<String>,
}
