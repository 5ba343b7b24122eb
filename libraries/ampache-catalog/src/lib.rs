//! Ampache Player - Catalog
//!
//! Client-side view of the remote catalog.
//!
//! This crate provides:
//! - Bounded LRU caches for album and song records (fetch on miss)
//! - Album sort views (by name, by artist) with a switchable active ordering
//! - The `Catalog` session facade: connect, list, resolve by id or index
//!
//! # Architecture
//!
//! The network is reached only through [`ampache_core::CatalogSource`]; caches
//! never hold authoritative data and transparently re-fetch evicted records.
//! Cache critical sections (lookup, store, evict) are short mutex sections;
//! fetches run outside them, so misses for different ids proceed in parallel.
//!
//! # Example
//!
//! ```rust,ignore
//! use ampache_catalog::{Catalog, CatalogSettings};
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(Arc::new(client), CatalogSettings::default());
//! let session = catalog.connect().await?;
//!
//! for index in 0..catalog.album_count() {
//!     let album = catalog.album_by_index(index).await?;
//!     println!("{:>4}  {} - {}", index, album.artist, album.name);
//! }
//! ```

mod cache;
mod catalog;
mod sort;

pub use cache::CatalogCache;
pub use catalog::{Catalog, CatalogSettings};
pub use sort::SortIndex;

// Re-exported for convenience
pub use ampache_core::{CatalogError, Result, SortOrder};
