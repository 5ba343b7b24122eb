//! Catalog operations for the Ampache server.

use crate::client::fetch_xml;
use crate::types::{AlbumsResponse, SongsResponse, XmlError};
use ampache_core::{AlbumId, AlbumRecord, CatalogError, Result, SongId, SongRecord};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Maximum number of songs requested for one album listing
const ALBUM_SONGS_LIMIT: usize = 5000;

/// Catalog client bound to a session token.
pub struct LibraryClient<'a> {
    http: &'a Client,
    endpoint: &'a str,
    token: String,
    timeout: Duration,
}

impl<'a> LibraryClient<'a> {
    pub(crate) fn new(http: &'a Client, endpoint: &'a str, token: String, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            token,
            timeout,
        }
    }

    /// Get one page of the album list.
    pub async fn list_albums(&self, offset: usize, limit: usize) -> Result<Vec<AlbumRecord>> {
        debug!(offset, limit, "Fetching album page");

        let response: AlbumsResponse = self
            .get(&[
                ("action", "albums".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(server_error(error));
        }

        let albums = response
            .albums
            .into_iter()
            .map(|a| a.into_record())
            .collect::<Result<Vec<_>>>()?;

        debug!(offset, received = albums.len(), "Fetched album page");
        Ok(albums)
    }

    /// Get a single album by ID.
    pub async fn get_album(&self, id: AlbumId) -> Result<AlbumRecord> {
        debug!(album_id = %id, "Fetching album");

        let response: AlbumsResponse = self
            .get(&[("action", "album".to_string()), ("filter", id.to_string())])
            .await?;

        if let Some(error) = response.error {
            return Err(entity_error(error, "album", id));
        }

        response
            .albums
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::not_found("album", id))?
            .into_record()
    }

    /// Get a single song by ID.
    pub async fn get_song(&self, id: SongId) -> Result<SongRecord> {
        debug!(song_id = %id, "Fetching song");

        let response: SongsResponse = self
            .get(&[("action", "song".to_string()), ("filter", id.to_string())])
            .await?;

        if let Some(error) = response.error {
            return Err(entity_error(error, "song", id));
        }

        response
            .songs
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::not_found("song", id))?
            .into_record()
    }

    /// Get the songs of an album, ordered by track number.
    pub async fn get_album_songs(&self, album_id: AlbumId) -> Result<Vec<SongRecord>> {
        debug!(album_id = %album_id, "Fetching album songs");

        let response: SongsResponse = self
            .get(&[
                ("action", "album_songs".to_string()),
                ("filter", album_id.to_string()),
                ("offset", "0".to_string()),
                ("limit", ALBUM_SONGS_LIMIT.to_string()),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(entity_error(error, "album", album_id));
        }

        let mut songs = response
            .songs
            .into_iter()
            .map(|s| s.into_record())
            .collect::<Result<Vec<_>>>()?;
        songs.sort_by_key(|s| s.track_number);

        debug!(album_id = %album_id, songs = songs.len(), "Fetched album songs");
        Ok(songs)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, String)]) -> Result<T> {
        let mut query = Vec::with_capacity(params.len() + 1);
        query.extend_from_slice(params);
        query.push(("auth", self.token.clone()));

        fetch_xml(self.http, self.endpoint, &query, self.timeout).await
    }
}

fn server_error(error: XmlError) -> CatalogError {
    CatalogError::Server {
        code: error.code(),
        message: error.message(),
    }
}

fn entity_error(error: XmlError, entity: &str, id: impl ToString) -> CatalogError {
    if error.is_not_found() {
        CatalogError::not_found(entity, id)
    } else {
        server_error(error)
    }
}
