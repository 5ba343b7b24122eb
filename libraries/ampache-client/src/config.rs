//! Persisted client configuration.

use crate::auth::hash_password;
use ampache_core::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Connection settings for an Ampache server.
///
/// Only the hex SHA-256 of the password is kept; it is combined with a fresh
/// timestamp before every handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server (e.g. "https://music.example.com")
    #[serde(default)]
    pub server_url: String,

    #[serde(default)]
    pub user: String,

    /// Hex SHA-256 of the user's password
    #[serde(default)]
    pub password_hash: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            user: String::new(),
            password_hash: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Create a config with server URL and user, without credentials.
    pub fn new(server_url: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user: user.into(),
            ..Self::default()
        }
    }

    /// Builder variant of [`ClientConfig::set_password`].
    pub fn with_password(mut self, password: &str) -> Self {
        self.set_password(password);
        self
    }

    /// Store the hash of `password`. An empty password leaves the stored hash untouched.
    pub fn set_password(&mut self, password: &str) {
        if !password.is_empty() {
            self.password_hash = hash_password(password);
        }
    }

    /// Whether everything needed for a handshake is present.
    pub fn login_data_available(&self) -> bool {
        !self.server_url.is_empty() && !self.user.is_empty() && !self.password_hash.is_empty()
    }

    /// Server URL without trailing slashes.
    pub fn normalized_url(&self) -> String {
        self.server_url.trim().trim_end_matches('/').to_string()
    }

    /// Validate the server URL.
    pub fn validate(&self) -> Result<()> {
        let url = self.normalized_url();
        if url.is_empty() {
            return Err(CatalogError::InvalidConfig("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CatalogError::InvalidConfig(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url)
            .map_err(|e| CatalogError::InvalidConfig(format!("Invalid server URL: {}", e)))?;
        if self.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Load the configuration from a JSON file.
    ///
    /// A missing file yields the default configuration, which is written back
    /// so the user has a file to edit.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Self = serde_json::from_str(&contents)?;
                debug!(path = %path.display(), server = %config.server_url, "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration file found, creating a new one");
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save the configuration as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}
