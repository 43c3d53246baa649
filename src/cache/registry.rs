//! Store Registry Module
//!
//! Owns every named cache store and ties store names to the current cache
//! generation. A store belongs to a generation when its name carries that
//! generation's version suffix; activation purges everything else. That
//! purge is the only eviction mechanism in the system.

use std::collections::HashMap;

use tracing::info;

use crate::cache::{CacheStats, CacheStore};

// == Store Registry ==
/// Registry of versioned named cache stores.
#[derive(Debug)]
pub struct StoreRegistry {
    /// Current cache generation tag
    version: String,
    /// Qualified store name -> store
    stores: HashMap<String, CacheStore>,
}

impl StoreRegistry {
    // == Constructor ==
    /// Creates an empty registry for the given generation tag.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            stores: HashMap::new(),
        }
    }

    /// Current generation tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Switches the registry to a new generation tag.
    ///
    /// Existing stores keep their old names until
    /// [`purge_stale_generations`](Self::purge_stale_generations) runs, so a
    /// version switch followed by activation behaves like replacing the
    /// whole cache wholesale.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// The qualified name a base store name resolves to in this generation.
    pub fn qualified_name(&self, base: &str) -> String {
        format!("{base}-{}", self.version)
    }

    // == Open ==
    /// Returns the store for a base name in the current generation,
    /// creating it on first use.
    pub fn open(&mut self, base: &str) -> &mut CacheStore {
        let name = self.qualified_name(base);
        self.stores
            .entry(name.clone())
            .or_insert_with(|| CacheStore::new(name))
    }

    /// Looks up a current-generation store without creating it.
    pub fn get(&self, base: &str) -> Option<&CacheStore> {
        self.stores.get(&self.qualified_name(base))
    }

    /// All qualified store names, sorted for stable output.
    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.keys().cloned().collect();
        names.sort();
        names
    }

    // == Purge ==
    /// Deletes every store that does not belong to the current generation.
    ///
    /// Returns the names of the deleted stores.
    pub fn purge_stale_generations(&mut self) -> Vec<String> {
        let suffix = format!("-{}", self.version);
        let stale: Vec<String> = self
            .stores
            .keys()
            .filter(|name| !name.ends_with(&suffix))
            .cloned()
            .collect();

        for name in &stale {
            self.stores.remove(name);
            info!(store = %name, "purged stale cache generation");
        }

        stale
    }

    // == Delete URL ==
    /// Removes a single URL from every store, regardless of generation.
    ///
    /// Returns true if at least one entry was removed.
    pub fn delete_url(&mut self, url: &str) -> bool {
        let mut removed = false;
        for store in self.stores.values_mut() {
            removed |= store.delete(url);
        }
        removed
    }

    // == Stats ==
    /// Per-store statistics, sorted by store name.
    pub fn stats(&self) -> Vec<(String, CacheStats)> {
        let mut stats: Vec<(String, CacheStats)> = self
            .stores
            .iter()
            .map(|(name, store)| (name.clone(), store.stats()))
            .collect();
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats
    }
}
