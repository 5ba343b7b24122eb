use super::AlbumId;
use serde::{Deserialize, Serialize};

/// Album metadata as reported by the server
///
/// Immutable once fetched. Caches hold copies; the server stays the source
/// of truth, so a record may be dropped and fetched again at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: AlbumId,
    pub name: String,
    pub artist: String,
    /// Cover art URL (may be empty)
    pub cover_url: String,
    pub track_count: u32,
}

impl AlbumRecord {
    pub fn new(id: AlbumId, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            artist: artist.into(),
            cover_url: String::new(),
            track_count: 0,
        }
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = url.into();
        self
    }

    pub fn with_track_count(mut self, count: u32) -> Self {
        self.track_count = count;
        self
    }
}

/// Ordering used to resolve album indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Albums ordered by album name
    ByName,
    /// Albums ordered by artist name
    #[default]
    ByArtist,
}

impl SortOrder {
    /// The other ordering
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::ByName => SortOrder::ByArtist,
            SortOrder::ByArtist => SortOrder::ByName,
        }
    }
}
