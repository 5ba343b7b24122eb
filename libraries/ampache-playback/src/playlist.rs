//! Ordered track list with a cursor

use ampache_core::PlaylistEntry;

/// Ordered sequence of entries with a movable cursor
///
/// The cursor is `None` exactly when the playlist is empty. It moves by one
/// step (`next`, `previous`), clamping at both ends, or jumps via `select`.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries to the back, or right after the cursor ("play next")
    ///
    /// Inserting into an empty playlist places the cursor on the first new
    /// entry. Otherwise the cursor keeps pointing at the same entry.
    pub fn add(&mut self, entries: Vec<PlaylistEntry>, append_to_back: bool) {
        if entries.is_empty() {
            return;
        }

        match self.current {
            Some(current) if !append_to_back => {
                let at = current + 1;
                self.entries.splice(at..at, entries);
            }
            _ => self.entries.extend(entries),
        }

        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Advance the cursor; a no-op on the last entry
    pub fn next(&mut self) -> Option<&PlaylistEntry> {
        if self.has_next() {
            self.current = self.current.map(|i| i + 1);
        }
        self.current()
    }

    /// Move the cursor back; a no-op on the first entry
    pub fn previous(&mut self) -> Option<&PlaylistEntry> {
        if self.has_previous() {
            self.current = self.current.map(|i| i - 1);
        }
        self.current()
    }

    /// Move the cursor to `index` if it is valid
    ///
    /// An invalid index leaves the cursor where it was and returns the
    /// unchanged current entry; use [`Playlist::has_index`] to tell the two
    /// cases apart.
    pub fn select(&mut self, index: usize) -> Option<&PlaylistEntry> {
        if self.has_index(index) {
            self.current = Some(index);
        }
        self.current()
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn has_index(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }
}
