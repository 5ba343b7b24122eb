//! Core types for playback

use ampache_core::{AlbumId, PlaylistEntry, SongId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the playback engine
///
/// Mirrors the lifecycle of the single media resource the engine owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// No source loaded
    #[default]
    Idle,

    /// Source set, not yet prepared
    Initialized,

    /// Source prepared and ready to start
    Prepared,

    Playing,

    Paused,

    /// Playback stopped; a new source must be prepared
    Stopped,

    /// Engine released; no further playback possible
    Ended,

    /// The backend failed; `stop` is required before playing again
    Error,
}

/// Player state as seen by status listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No status was published yet
    #[default]
    Undefined,
    Stopped,
    Playing,
    Paused,
    Error,
}

impl From<EngineState> for PlayerState {
    fn from(state: EngineState) -> Self {
        match state {
            EngineState::Playing => PlayerState::Playing,
            EngineState::Paused => PlayerState::Paused,
            EngineState::Error => PlayerState::Error,
            EngineState::Idle
            | EngineState::Initialized
            | EngineState::Prepared
            | EngineState::Stopped
            | EngineState::Ended => PlayerState::Stopped,
        }
    }
}

/// Snapshot of the playback state, published once per processed command
///
/// Listeners should treat the latest event as the only source of truth and
/// not keep state of their own beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Album of the current entry (`None` with an empty playlist)
    pub album_id: Option<AlbumId>,

    /// Position of the current entry within its album
    pub track_index: u32,

    pub song_id: Option<SongId>,

    /// Stream URL of the current entry (empty with an empty playlist)
    pub url: String,

    pub duration_seconds: u32,

    /// Elapsed playback time of the current track in milliseconds
    pub progress_ms: u64,

    /// Cursor position in the playlist
    pub playlist_index: Option<usize>,

    pub playlist_len: usize,

    pub new_state: PlayerState,

    /// State reported by the previous event
    pub old_state: PlayerState,

    /// Failure of the command processed in this cycle, if any
    pub error: Option<String>,
}

impl StatusEvent {
    pub(crate) fn new(current: Option<&PlaylistEntry>) -> Self {
        Self {
            album_id: current.map(|e| e.album_id),
            track_index: current.map_or(0, |e| e.track_index),
            song_id: current.map(|e| e.song_id),
            url: current.map(|e| e.url.clone()).unwrap_or_default(),
            duration_seconds: current.map_or(0, |e| e.duration_seconds),
            progress_ms: 0,
            playlist_index: None,
            playlist_len: 0,
            new_state: PlayerState::Undefined,
            old_state: PlayerState::Undefined,
            error: None,
        }
    }

    /// Whether the player reports active playback
    pub fn is_playing(&self) -> bool {
        self.new_state == PlayerState::Playing
    }

    /// Whether the state changed with this event
    pub fn state_changed(&self) -> bool {
        self.new_state != self.old_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_states_map_to_player_states() {
        assert_eq!(PlayerState::from(EngineState::Idle), PlayerState::Stopped);
        assert_eq!(PlayerState::from(EngineState::Prepared), PlayerState::Stopped);
        assert_eq!(PlayerState::from(EngineState::Ended), PlayerState::Stopped);
        assert_eq!(PlayerState::from(EngineState::Playing), PlayerState::Playing);
        assert_eq!(PlayerState::from(EngineState::Paused), PlayerState::Paused);
        assert_eq!(PlayerState::from(EngineState::Error), PlayerState::Error);
    }

    #[test]
    fn empty_event() {
        let event = StatusEvent::new(None);
        assert_eq!(event.album_id, None);
        assert!(event.url.is_empty());
        assert!(!event.is_playing());
        assert!(!event.state_changed());
    }
}
