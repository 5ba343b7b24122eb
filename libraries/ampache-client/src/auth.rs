//! Handshake for the Ampache server.

use crate::client::fetch_xml;
use crate::types::HandshakeResponse;
use ampache_core::{Result, SessionInfo};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hash a plaintext password the way the server stores it (hex SHA-256).
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Derive the time-boxed handshake passphrase.
///
/// `hex(sha256(timestamp + password_hash))`, where `timestamp` is the decimal
/// Unix time sent alongside it.
pub fn passphrase(timestamp: i64, password_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(password_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authentication client for the Ampache server.
pub struct AuthClient<'a> {
    http: &'a Client,
    endpoint: &'a str,
    timeout: Duration,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, endpoint: &'a str, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            timeout,
        }
    }

    /// Perform the handshake for `user`.
    ///
    /// Returns the session token and catalog counts on success.
    pub async fn handshake(
        &self,
        user: &str,
        password_hash: &str,
        timestamp: i64,
    ) -> Result<SessionInfo> {
        debug!(endpoint = %self.endpoint, user = %user, "Attempting handshake");

        let params = [
            ("action", "handshake".to_string()),
            ("auth", passphrase(timestamp, password_hash)),
            ("timestamp", timestamp.to_string()),
            ("user", user.to_string()),
        ];

        let response: HandshakeResponse =
            fetch_xml(self.http, self.endpoint, &params, self.timeout).await?;

        match response.into_session() {
            Ok(session) => {
                info!(
                    user = %user,
                    albums = session.album_count,
                    artists = session.artist_count,
                    "Handshake successful"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Handshake rejected");
                Err(e)
            }
        }
    }
}
