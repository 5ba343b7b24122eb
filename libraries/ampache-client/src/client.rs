//! Main Ampache server client.

use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::library::LibraryClient;
use ampache_core::{
    AlbumId, AlbumRecord, CatalogError, CatalogSource, Result, SessionInfo, SongId, SongRecord,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Path of the XML API below the server URL
const XML_API_PATH: &str = "/server/xml.server.php";

/// Client for the Ampache XML API.
///
/// Holds the HTTP connection pool, the configured credentials and, once
/// `handshake` succeeded, the session token used by every catalog call.
///
/// # Example
///
/// ```ignore
/// use ampache_client::{AmpacheClient, ClientConfig};
/// use ampache_core::{AlbumId, CatalogSource};
///
/// let client = AmpacheClient::new(ClientConfig::new("https://music.example.com", "alice"))?;
/// client.handshake().await?;
/// let album = client.get_album(AlbumId::new(12)).await?;
/// println!("{} by {}", album.name, album.artist);
/// ```
pub struct AmpacheClient {
    http: Client,
    config: ClientConfig,
    endpoint: String,
    timeout: Duration,
    session: RwLock<Option<SessionInfo>>,
}

impl AmpacheClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let config = ClientConfig {
            server_url: config.normalized_url(),
            ..config
        };
        let timeout = Duration::from_secs(config.timeout_secs);

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("AmpachePlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", config.server_url, XML_API_PATH),
            config,
            timeout,
            session: RwLock::new(None),
        })
    }

    /// Get the (normalized) server URL.
    pub fn url(&self) -> &str {
        &self.config.server_url
    }

    /// Get the XML API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if a handshake succeeded.
    pub async fn is_connected(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Session established by the last successful handshake.
    pub async fn session(&self) -> Option<SessionInfo> {
        self.session.read().await.clone()
    }

    /// Drop the session token.
    pub async fn disconnect(&self) {
        *self.session.write().await = None;
        info!("Disconnected");
    }

    /// Get a library client bound to the current session token.
    ///
    /// Returns `NotConnected` before a successful handshake.
    pub async fn library(&self) -> Result<LibraryClient<'_>> {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(CatalogError::NotConnected)?;

        Ok(LibraryClient::new(
            &self.http,
            &self.endpoint,
            token,
            self.timeout,
        ))
    }
}

#[async_trait]
impl CatalogSource for AmpacheClient {
    async fn handshake(&self) -> Result<SessionInfo> {
        if !self.config.login_data_available() {
            return Err(CatalogError::InvalidConfig(
                "Server URL, user and password are required".into(),
            ));
        }

        let timestamp = chrono::Utc::now().timestamp();
        let auth = AuthClient::new(&self.http, &self.endpoint, self.timeout);
        let session = auth
            .handshake(&self.config.user, &self.config.password_hash, timestamp)
            .await?;

        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn list_albums(&self, offset: usize, limit: usize) -> Result<Vec<AlbumRecord>> {
        self.library().await?.list_albums(offset, limit).await
    }

    async fn get_album(&self, id: AlbumId) -> Result<AlbumRecord> {
        self.library().await?.get_album(id).await
    }

    async fn get_song(&self, id: SongId) -> Result<SongRecord> {
        self.library().await?.get_song(id).await
    }

    async fn get_album_songs(&self, album_id: AlbumId) -> Result<Vec<SongRecord>> {
        self.library().await?.get_album_songs(album_id).await
    }
}

/// Issue a GET against the XML API and deserialize the body.
///
/// Connection failures map to `Transport`, elapsed deadlines to `Timeout`,
/// non-success HTTP statuses to `Server` and undecodable bodies to `Protocol`.
pub(crate) async fn fetch_xml<T: DeserializeOwned>(
    http: &Client,
    endpoint: &str,
    params: &[(&str, String)],
    timeout: Duration,
) -> Result<T> {
    let action = params
        .iter()
        .find(|(k, _)| *k == "action")
        .map(|(_, v)| v.as_str())
        .unwrap_or("?");
    debug!(endpoint = %endpoint, action = %action, "Sending request");

    let response = http.get(endpoint).query(params).send().await.map_err(|e| {
        if e.is_timeout() {
            CatalogError::Timeout(timeout)
        } else {
            CatalogError::transport(e.to_string())
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            CatalogError::Timeout(timeout)
        } else {
            CatalogError::transport(e.to_string())
        }
    })?;

    if !status.is_success() {
        return Err(CatalogError::Server {
            code: status.as_u16().to_string(),
            message: body,
        });
    }

    quick_xml::de::from_str(&body).map_err(|e| {
        CatalogError::protocol(format!("Failed to parse {} response: {}", action, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        let ok = |url: &str| AmpacheClient::new(ClientConfig::new(url, "user")).is_ok();

        assert!(ok("https://example.com"));
        assert!(ok("http://localhost:8080"));

        assert!(!ok(""));
        assert!(!ok("not-a-url"));
        assert!(!ok("ftp://example.com"));
    }

    #[test]
    fn test_endpoint_normalization() {
        let client =
            AmpacheClient::new(ClientConfig::new("https://example.com/ampache/", "user"))
                .expect("valid url");

        assert_eq!(client.url(), "https://example.com/ampache");
        assert_eq!(
            client.endpoint(),
            "https://example.com/ampache/server/xml.server.php"
        );
    }

    #[tokio::test]
    async fn test_calls_before_handshake_are_rejected() {
        let client = AmpacheClient::new(ClientConfig::new("http://localhost:1", "user")).unwrap();

        assert!(!client.is_connected().await);
        assert!(matches!(
            client.get_album(AlbumId::new(1)).await,
            Err(CatalogError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_handshake_requires_credentials() {
        let client = AmpacheClient::new(ClientConfig::new("http://localhost:1", "user")).unwrap();

        assert!(matches!(
            client.handshake().await,
            Err(CatalogError::InvalidConfig(_))
        ));
    }
}
