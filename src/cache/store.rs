//! Cache Store Module
//!
//! One named partition mapping request URLs to stored response snapshots.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheStats, StoredResponse, MAX_BODY_SIZE};

// == Cache Store ==
/// A single named cache partition.
///
/// Keys are full request URLs; only GET responses are ever stored (the
/// caller enforces the method, the store enforces the body-size cap).
#[derive(Debug)]
pub struct CacheStore {
    /// Store name, already qualified with the generation tag
    name: String,
    /// URL -> response snapshot
    entries: HashMap<String, StoredResponse>,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new empty store with the given qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            stats: CacheStats::new(),
        }
    }

    /// The qualified store name (e.g. `images-v1`).
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Retrieves a snapshot by URL, recording a hit or miss.
    pub fn get(&mut self, url: &str) -> Option<StoredResponse> {
        match self.entries.get(url) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Looks up a snapshot without touching statistics.
    pub fn peek(&self, url: &str) -> Option<&StoredResponse> {
        self.entries.get(url)
    }

    // == Put ==
    /// Stores a snapshot under a URL, overwriting any previous entry.
    ///
    /// Returns false (and stores nothing) when the body exceeds
    /// [`MAX_BODY_SIZE`]; the response itself is still usable by the caller.
    pub fn put(&mut self, url: &str, response: StoredResponse) -> bool {
        if response.body_size() > MAX_BODY_SIZE {
            debug!(
                store = %self.name,
                url,
                size = response.body_size(),
                "response body over cache cap, serving uncached"
            );
            return false;
        }

        self.entries.insert(url.to_string(), response);
        self.stats.set_total_entries(self.entries.len());
        true
    }

    // == Delete ==
    /// Removes an entry by URL. Returns true if something was removed.
    pub fn delete(&mut self, url: &str) -> bool {
        let removed = self.entries.remove(url).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
