//! Rule memories of the previous run, diffed to detect rule changes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use quire_config::{store_path, SiteConfig};
use quire_diagnostics::DiagnosticSink;
use quire_model::{RepKey, RuleMemory};

use crate::error::StoreError;
use crate::versioned::VersionedStore;

/// The last rule memory computed for each rep.
#[derive(Debug)]
pub struct RuleMemoryStore {
    store: VersionedStore,
    entries: BTreeMap<RepKey, RuleMemory>,
}

impl RuleMemoryStore {
    /// Store name.
    pub const NAME: &'static str = "rule_memory";
    /// Store format version.
    pub const VERSION: u32 = 1;

    /// Creates the store for a site configuration.
    pub fn new(config: &SiteConfig) -> Self {
        Self::at(store_path(config, Self::NAME))
    }

    /// Creates the store at an explicit base path.
    pub fn at(base: PathBuf) -> Self {
        Self {
            store: VersionedStore::new(base, Self::VERSION),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the previous run's memories.
    pub fn load(&mut self, sink: &DiagnosticSink) -> Result<(), StoreError> {
        self.entries = self.store.load(sink)?.unwrap_or_default();
        Ok(())
    }

    /// Returns the stored memory of a rep.
    pub fn get(&self, key: &RepKey) -> Option<&RuleMemory> {
        self.entries.get(key)
    }

    /// Records the memory of a rep.
    pub fn insert(&mut self, key: RepKey, memory: RuleMemory) {
        self.entries.insert(key, memory);
    }

    /// Drops memories of reps that no longer exist.
    pub fn prune(&mut self, live: &BTreeSet<RepKey>) {
        self.entries.retain(|key, _| live.contains(key));
    }

    /// Persists the store.
    pub fn store(&self) -> Result<(), StoreError> {
        self.store.store(&self.entries)
    }
}
