use super::{AlbumId, SongId, SongRecord};
use serde::{Deserialize, Serialize};

/// One playable entry of a playlist
///
/// Plain value: everything needed to start playback without touching the
/// catalog again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub album_id: AlbumId,
    pub song_id: SongId,
    /// Position of the song within its album's track listing
    pub track_index: u32,
    pub url: String,
    pub duration_seconds: u32,
}

impl PlaylistEntry {
    /// Build an entry for `song` at position `track_index` of `album_id`
    pub fn from_song(album_id: AlbumId, track_index: u32, song: &SongRecord) -> Self {
        Self {
            album_id,
            song_id: song.id,
            track_index,
            url: song.url.clone(),
            duration_seconds: song.duration_seconds,
        }
    }
}
