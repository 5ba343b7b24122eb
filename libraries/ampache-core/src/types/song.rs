use super::SongId;
use serde::{Deserialize, Serialize};

/// Song metadata as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: SongId,
    pub title: String,
    /// Stream URL, already authenticated by the server
    pub url: String,
    pub track_number: u32,
    pub duration_seconds: u32,
}

impl SongRecord {
    pub fn new(id: SongId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            track_number: 0,
            duration_seconds: 0,
        }
    }

    pub fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = track_number;
        self
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }
}
