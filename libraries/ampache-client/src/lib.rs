//! Ampache Server Client
//!
//! HTTP client library for the Ampache XML API.
//!
//! # Features
//!
//! - **Handshake**: time-boxed SHA-256 passphrase, session token handling
//! - **Catalog**: album pages, single albums and songs, album track listings
//! - **Configuration**: persisted server/user settings with a hashed password
//!
//! `AmpacheClient` implements [`ampache_core::CatalogSource`], which is all
//! the catalog cache needs to know about the network.
//!
//! # Example
//!
//! ```ignore
//! use ampache_client::{AmpacheClient, ClientConfig};
//! use ampache_core::CatalogSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://music.example.com", "alice")
//!         .with_password("secret");
//!     let client = AmpacheClient::new(config)?;
//!
//!     let session = client.handshake().await?;
//!     println!("Server lists {} albums", session.album_count);
//!
//!     let first_page = client.list_albums(0, 10).await?;
//!     for album in first_page {
//!         println!("{} - {}", album.artist, album.name);
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod library;
mod types;

pub use auth::{hash_password, passphrase, AuthClient};
pub use client::AmpacheClient;
pub use config::ClientConfig;
pub use library::LibraryClient;
