/// Core traits for the Ampache player
use crate::error::Result;
use crate::types::{AlbumId, AlbumRecord, SessionInfo, SongId, SongRecord};
use async_trait::async_trait;

/// Remote catalog collaborator
///
/// Implementers perform the network calls against the music server. The
/// catalog crate only depends on this trait, so caches and sort views can be
/// exercised against in-memory sources.
///
/// Credentials are part of the implementer's configuration: `handshake`
/// derives whatever time-boxed proof the server wants and keeps the returned
/// token for the calls that follow.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Authenticate and open a session
    ///
    /// # Errors
    /// `AuthFailed` with the server message when the server rejects the
    /// credentials, `Transport` when it cannot be reached.
    async fn handshake(&self) -> Result<SessionInfo>;

    /// Fetch one page of the album list
    ///
    /// Returns fewer than `limit` records (possibly none) at the end of the list.
    async fn list_albums(&self, offset: usize, limit: usize) -> Result<Vec<AlbumRecord>>;

    /// Fetch a single album
    ///
    /// # Errors
    /// `NotFound` when the server has no album with this id.
    async fn get_album(&self, id: AlbumId) -> Result<AlbumRecord>;

    /// Fetch a single song
    ///
    /// # Errors
    /// `NotFound` when the server has no song with this id.
    async fn get_song(&self, id: SongId) -> Result<SongRecord>;

    /// Fetch the songs of an album, ordered by track number
    async fn get_album_songs(&self, album_id: AlbumId) -> Result<Vec<SongRecord>>;
}
