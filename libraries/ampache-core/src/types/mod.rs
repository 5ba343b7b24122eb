//! Domain types for the Ampache player

mod album;
mod ids;
mod playlist;
mod session;
mod song;

pub use album::{AlbumRecord, SortOrder};
pub use ids::{AlbumId, SongId};
pub use playlist::PlaylistEntry;
pub use session::SessionInfo;
pub use song::SongRecord;
