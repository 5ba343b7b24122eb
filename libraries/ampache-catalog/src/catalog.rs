//! Catalog session facade

use crate::cache::CatalogCache;
use crate::sort::SortIndex;
use ampache_core::{
    AlbumId, AlbumRecord, CatalogError, CatalogSource, PlaylistEntry, Result, SessionInfo, SongId,
    SongRecord, SortOrder,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Catalog tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Maximum number of cached album records (default: 30)
    #[serde(default = "default_album_cache_capacity")]
    pub album_cache_capacity: usize,

    /// Maximum number of cached song records (default: 50)
    #[serde(default = "default_song_cache_capacity")]
    pub song_cache_capacity: usize,

    /// Upper bound for a single fetch in seconds (default: 30)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Albums requested per page while connecting (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_album_cache_capacity() -> usize {
    30
}

fn default_song_cache_capacity() -> usize {
    50
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    50
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            album_cache_capacity: default_album_cache_capacity(),
            song_cache_capacity: default_song_cache_capacity(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

/// Client-side view of the remote catalog
///
/// Owns the album and song caches and the album sort index. Safe to share
/// between tasks (`Arc<Catalog>`); locks are never held across an await.
pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    albums: CatalogCache<AlbumId, AlbumRecord>,
    songs: CatalogCache<SongId, SongRecord>,
    index: RwLock<SortIndex>,
    session: RwLock<Option<SessionInfo>>,
    page_size: usize,
    fetch_timeout: Duration,
}

impl Catalog {
    /// Create a catalog over `source`. Call [`Catalog::connect`] before any lookup by index.
    pub fn new(source: Arc<dyn CatalogSource>, settings: CatalogSettings) -> Self {
        let fetch_timeout = Duration::from_secs(settings.fetch_timeout_secs);
        let capacity = |n: usize| NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);

        Self {
            source,
            albums: CatalogCache::new(
                "album",
                capacity(settings.album_cache_capacity),
                fetch_timeout,
            ),
            songs: CatalogCache::new("song", capacity(settings.song_cache_capacity), fetch_timeout),
            index: RwLock::new(SortIndex::new()),
            session: RwLock::new(None),
            page_size: settings.page_size.max(1),
            fetch_timeout,
        }
    }

    fn index(&self) -> RwLockReadGuard<'_, SortIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn index_mut(&self) -> RwLockWriteGuard<'_, SortIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authenticate, retrieve the full album list and rebuild the sort index
    ///
    /// Paging stops once the announced album count was received, or early
    /// when the server returns an empty page. Reconnecting drops all cached
    /// records.
    pub async fn connect(&self) -> Result<SessionInfo> {
        let session = self.bounded(self.source.handshake()).await?;
        info!(
            albums = session.album_count,
            artists = session.artist_count,
            songs = session.song_count,
            "Connected to catalog"
        );

        let mut albums: Vec<AlbumRecord> = Vec::with_capacity(session.album_count);
        while albums.len() < session.album_count {
            let offset = albums.len();
            let page = self
                .bounded(self.source.list_albums(offset, self.page_size))
                .await?;
            if page.is_empty() {
                warn!(
                    received = offset,
                    expected = session.album_count,
                    "Server returned an empty album page, stopping"
                );
                break;
            }
            debug!(offset, received = page.len(), "Received album page");
            albums.extend(page);
        }

        self.albums.clear();
        self.songs.clear();
        {
            let mut index = self.index_mut();
            index.build(&albums);
            info!(albums = index.len(), order = ?index.current_order(), "Built album index");
        }
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());

        Ok(session)
    }

    /// Session of the last successful connect
    pub fn session(&self) -> Option<SessionInfo> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve an album, fetching it on a cache miss
    pub async fn album(&self, id: AlbumId) -> Result<Arc<AlbumRecord>> {
        let source = Arc::clone(&self.source);
        self.albums
            .get_or_fetch(id, move || async move { source.get_album(id).await })
            .await
    }

    /// Cached album, if any. Never fetches.
    pub fn album_if_cached(&self, id: AlbumId) -> Option<Arc<AlbumRecord>> {
        self.albums.get_if_cached(&id)
    }

    /// Resolve the album at `index` of the active ordering
    ///
    /// # Errors
    /// `IndexOutOfRange` when `index >= album_count()`.
    pub async fn album_by_index(&self, index: usize) -> Result<Arc<AlbumRecord>> {
        let id = self.id_at(index)?;
        self.album(id).await
    }

    /// Cached album at `index` of the active ordering. Never fetches.
    pub fn album_by_index_if_cached(&self, index: usize) -> Result<Option<Arc<AlbumRecord>>> {
        let id = self.id_at(index)?;
        Ok(self.album_if_cached(id))
    }

    /// Resolve a song, fetching it on a cache miss
    pub async fn song(&self, id: SongId) -> Result<Arc<SongRecord>> {
        let source = Arc::clone(&self.source);
        self.songs
            .get_or_fetch(id, move || async move { source.get_song(id).await })
            .await
    }

    pub fn song_if_cached(&self, id: SongId) -> Option<Arc<SongRecord>> {
        self.songs.get_if_cached(&id)
    }

    /// Songs of an album ordered by track number
    ///
    /// Always asks the source; every returned song is stored in the song cache.
    pub async fn album_songs(&self, album_id: AlbumId) -> Result<Vec<SongRecord>> {
        let songs = self
            .bounded(self.source.get_album_songs(album_id))
            .await?;

        for song in &songs {
            self.songs.insert(song.id, song.clone());
        }
        debug!(album_id = %album_id, songs = songs.len(), "Resolved album songs");
        Ok(songs)
    }

    /// Playlist entries for a whole album, in track order
    pub async fn album_playlist(&self, album_id: AlbumId) -> Result<Vec<PlaylistEntry>> {
        let songs = self.album_songs(album_id).await?;
        Ok(songs
            .iter()
            .enumerate()
            .map(|(position, song)| {
                PlaylistEntry::from_song(album_id, u32::try_from(position).unwrap_or(u32::MAX), song)
            })
            .collect())
    }

    /// Number of albums in the sort index
    pub fn album_count(&self) -> usize {
        self.index().len()
    }

    /// Album ids in the active ordering
    pub fn album_ids(&self) -> Vec<AlbumId> {
        self.index().index_sequence().to_vec()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.index().current_order()
    }

    /// Flip the active ordering, returning the new one
    pub fn toggle_sort_order(&self) -> SortOrder {
        let order = self.index_mut().toggle();
        debug!(order = ?order, "Toggled album sort order");
        order
    }

    pub fn set_sort_order(&self, order: SortOrder) {
        self.index_mut().set_order(order);
    }

    fn id_at(&self, index: usize) -> Result<AlbumId> {
        let sort = self.index();
        sort.id_at(index).ok_or(CatalogError::IndexOutOfRange {
            index,
            len: sort.len(),
        })
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.fetch_timeout, fut)
            .await
            .map_err(|_| CatalogError::Timeout(self.fetch_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampache_core::MockCatalogSource;

    fn session(album_count: usize) -> SessionInfo {
        SessionInfo {
            token: "token".into(),
            album_count,
            artist_count: 1,
            song_count: 0,
            api_version: None,
        }
    }

    fn album(id: u64, name: &str, artist: &str) -> AlbumRecord {
        AlbumRecord::new(AlbumId::new(id), name, artist)
    }

    fn catalog(mock: MockCatalogSource) -> Catalog {
        Catalog::new(Arc::new(mock), CatalogSettings::default())
    }

    #[test]
    fn default_settings() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.album_cache_capacity, 30);
        assert_eq!(settings.song_cache_capacity, 50);
        assert_eq!(settings.fetch_timeout_secs, 30);
        assert_eq!(settings.page_size, 50);
    }

    #[tokio::test]
    async fn connect_builds_index() {
        let mut mock = MockCatalogSource::new();
        mock.expect_handshake()
            .times(1)
            .returning(|| Ok(session(2)));
        mock.expect_list_albums()
            .withf(|offset, _| *offset == 0)
            .times(1)
            .returning(|_, _| Ok(vec![album(1, "B", "Z"), album(2, "A", "Y")]));

        let catalog = catalog(mock);
        catalog.connect().await.unwrap();

        assert_eq!(catalog.album_count(), 2);
        assert_eq!(catalog.sort_order(), SortOrder::ByArtist);
        assert_eq!(catalog.album_ids(), vec![AlbumId::new(2), AlbumId::new(1)]);
        assert_eq!(catalog.session().map(|s| s.album_count), Some(2));
    }

    #[tokio::test]
    async fn album_is_fetched_once() {
        let mut mock = MockCatalogSource::new();
        mock.expect_get_album()
            .times(1)
            .returning(|id| Ok(AlbumRecord::new(id, "Blue Train", "John Coltrane")));

        let catalog = catalog(mock);
        assert!(catalog.album_if_cached(AlbumId::new(5)).is_none());

        let first = catalog.album(AlbumId::new(5)).await.unwrap();
        let second = catalog.album(AlbumId::new(5)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            catalog.album_if_cached(AlbumId::new(5)).map(|a| a.name.clone()),
            Some("Blue Train".to_string())
        );
    }

    #[tokio::test]
    async fn index_out_of_range_before_connect() {
        let catalog = catalog(MockCatalogSource::new());

        match catalog.album_by_index(0).await {
            Err(CatalogError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 0);
                assert_eq!(len, 0);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
        assert!(catalog.album_by_index_if_cached(3).is_err());
    }

    #[tokio::test]
    async fn album_songs_populate_song_cache() {
        let mut mock = MockCatalogSource::new();
        mock.expect_get_album_songs().times(1).returning(|_| {
            Ok(vec![
                SongRecord::new(SongId::new(10), "One", "http://srv/play/10").with_track_number(1),
                SongRecord::new(SongId::new(11), "Two", "http://srv/play/11").with_track_number(2),
            ])
        });
        mock.expect_get_song().never();

        let catalog = catalog(mock);
        let entries = catalog.album_playlist(AlbumId::new(4)).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].track_index, 1);
        assert_eq!(entries[1].album_id, AlbumId::new(4));

        let song = catalog.song(SongId::new(11)).await.unwrap();
        assert_eq!(song.title, "Two");
    }
}
