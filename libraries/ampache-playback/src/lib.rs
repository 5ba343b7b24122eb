//! Ampache Player - Playback
//!
//! Platform-agnostic playback for Ampache Player.
//!
//! This crate provides:
//! - `PlaybackEngine`: the state machine around one media backend, with
//!   clock-based progress tracking
//! - `Playlist`: ordered entries with a clamping cursor
//! - `PlaybackController`: a worker thread that serializes every playback
//!   command and publishes a `StatusEvent` after each one
//!
//! # Architecture
//!
//! Platform-specific audio output is provided through the [`MediaBackend`]
//! trait. The controller owns the playlist and the engine; nothing else
//! touches them. Track completion travels from the backend's thread through
//! the controller's command queue, so auto-advance is ordered with user
//! commands.
//!
//! ```text
//!  UI / CLI ──Command──▶ ┌──────────────┐ ──StatusEvent──▶ subscribers
//!                        │    worker     │
//!  backend ─completion─▶ │ playlist +    │
//!                        │ engine        │
//!                        └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use ampache_playback::{Playlist, PlaylistEntry};
//! use ampache_core::{AlbumId, SongId};
//!
//! let entry = |song: u64| PlaylistEntry {
//!     album_id: AlbumId::new(1),
//!     song_id: SongId::new(song),
//!     track_index: 0,
//!     url: format!("https://example.com/play/{}", song),
//!     duration_seconds: 200,
//! };
//!
//! let mut playlist = Playlist::new();
//! playlist.add(vec![entry(1), entry(2)], true);
//! playlist.add(vec![entry(3)], false); // play next
//!
//! assert_eq!(playlist.next().map(|e| e.song_id), Some(SongId::new(3)));
//! ```

mod backend;
mod clock;
mod controller;
mod engine;
mod error;
mod events;
mod playlist;
pub mod types;

pub use backend::{CompletionCallback, MediaBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Command, PlaybackController};
pub use engine::{CompletionListener, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use playlist::Playlist;
pub use types::{EngineState, PlayerState, StatusEvent};

// Re-exported for convenience
pub use ampache_core::PlaylistEntry;
