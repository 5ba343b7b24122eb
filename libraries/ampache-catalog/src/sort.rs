//! Album sort views
//!
//! Two orderings of the same album id set, plus the selector that decides
//! which one index lookups resolve against.

use ampache_core::{AlbumId, AlbumRecord, SortOrder};

/// Album ids ordered by name and by artist
///
/// Both sequences are permutations of the same id set. They are built once
/// after the full album list was retrieved and rebuilt only on reconnect.
#[derive(Debug, Clone, Default)]
pub struct SortIndex {
    by_name: Vec<AlbumId>,
    by_artist: Vec<AlbumId>,
    order: SortOrder,
}

impl SortIndex {
    /// Create an empty index with the default ordering (by artist)
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild both orderings from the full album list
    ///
    /// Sorting is stable on the key with ties broken by ascending id. Duplicate
    /// ids keep their first occurrence. The active ordering is preserved.
    pub fn build(&mut self, albums: &[AlbumRecord]) {
        let mut seen = std::collections::HashSet::with_capacity(albums.len());
        let unique: Vec<&AlbumRecord> = albums.iter().filter(|a| seen.insert(a.id)).collect();

        self.by_name = sorted_ids(&unique, |a| a.name.as_str());
        self.by_artist = sorted_ids(&unique, |a| a.artist.as_str());
    }

    /// Flip the active ordering, returning the new one
    pub fn toggle(&mut self) -> SortOrder {
        self.order = self.order.toggled();
        self.order
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.order = order;
    }

    pub fn current_order(&self) -> SortOrder {
        self.order
    }

    /// Ids in the active ordering
    pub fn index_sequence(&self) -> &[AlbumId] {
        self.sequence(self.order)
    }

    /// Ids in the given ordering
    pub fn sequence(&self, order: SortOrder) -> &[AlbumId] {
        match order {
            SortOrder::ByName => &self.by_name,
            SortOrder::ByArtist => &self.by_artist,
        }
    }

    /// Album id at `index` of the active ordering
    pub fn id_at(&self, index: usize) -> Option<AlbumId> {
        self.index_sequence().get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Forget both orderings; the active ordering is kept
    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_artist.clear();
    }
}

fn sorted_ids<'a, F>(albums: &[&'a AlbumRecord], key: F) -> Vec<AlbumId>
where
    F: Fn(&'a AlbumRecord) -> &'a str,
{
    let mut sorted = albums.to_vec();
    sorted.sort_by(|a, b| key(*a).cmp(key(*b)).then(a.id.cmp(&b.id)));
    sorted.into_iter().map(|a| a.id).collect()
}
