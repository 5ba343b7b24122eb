//! Ampache Player Core
//!
//! Platform-agnostic types, the error taxonomy and the catalog source
//! abstraction shared by the client, catalog and playback crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AlbumRecord`, `SongRecord`, `PlaylistEntry`, `SessionInfo`
//! - **Core Traits**: `CatalogSource` (the network boundary to the remote server)
//! - **Error Handling**: Unified `CatalogError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use ampache_core::{AlbumId, AlbumRecord, PlaylistEntry, SongId, SongRecord};
//!
//! let album = AlbumRecord::new(AlbumId::new(7), "Blue Train", "John Coltrane");
//! let song = SongRecord::new(SongId::new(70), "Moment's Notice", "https://example.com/play/70")
//!     .with_track_number(2)
//!     .with_duration_seconds(551);
//!
//! let entry = PlaylistEntry::from_song(album.id, 1, &song);
//! assert_eq!(entry.duration_seconds, 551);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CatalogError, Result};
pub use traits::CatalogSource;
#[cfg(any(test, feature = "mock"))]
pub use traits::MockCatalogSource;
pub use types::{
    AlbumId, AlbumRecord, PlaylistEntry, SessionInfo, SongId, SongRecord, SortOrder,
};
