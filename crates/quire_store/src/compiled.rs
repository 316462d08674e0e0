//! Compiled content of every representation, per snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use quire_config::{store_path, SiteConfig};
use quire_diagnostics::DiagnosticSink;
use quire_model::{Content, RepKey};
use tracing::debug;

use crate::error::StoreError;
use crate::versioned::VersionedStore;

/// Snapshot name to content.
pub type Snapshots = BTreeMap<String, Content>;

/// Cache of compiled snapshots, reused for reps that are not outdated.
#[derive(Debug)]
pub struct CompiledContentCache {
    store: VersionedStore,
    entries: BTreeMap<RepKey, Snapshots>,
}

impl CompiledContentCache {
    /// Store name.
    pub const NAME: &'static str = "compiled_content";
    /// Store format version.
    pub const VERSION: u32 = 1;

    /// Creates the cache for a site configuration.
    pub fn new(config: &SiteConfig) -> Self {
        Self::at(store_path(config, Self::NAME))
    }

    /// Creates the cache at an explicit base path.
    pub fn at(base: PathBuf) -> Self {
        Self {
            store: VersionedStore::new(base, Self::VERSION),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the previous run's content.
    pub fn load(&mut self, sink: &DiagnosticSink) -> Result<(), StoreError> {
        self.entries = self.store.load(sink)?.unwrap_or_default();
        Ok(())
    }

    /// Returns the cached snapshots of a rep.
    pub fn get(&self, key: &RepKey) -> Option<&Snapshots> {
        self.entries.get(key)
    }

    /// Replaces the cached snapshots of a rep.
    pub fn insert(&mut self, key: RepKey, snapshots: Snapshots) {
        self.entries.insert(key, snapshots);
    }

    /// Drops entries of reps that no longer exist.
    pub fn prune(&mut self, live: &BTreeSet<RepKey>) {
        let before = self.entries.len();
        self.entries.retain(|key, _| live.contains(key));
        debug!(dropped = before - self.entries.len(), "pruned compiled content");
    }

    /// Persists the cache.
    pub fn store(&self) -> Result<(), StoreError> {
        self.store.store(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::Identifier;

    fn key(s: &str) -> RepKey {
        RepKey::new(Identifier::new(s).unwrap(), "default")
    }

    #[test]
    fn binary_content_survives_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("compiled_content");
        let bytes: Vec<u8> = (0..=255).collect();

        let mut cache = CompiledContentCache::at(base.clone());
        let mut snaps = Snapshots::new();
        snaps.insert("last".to_string(), Content::Binary(bytes.clone()));
        snaps.insert("raw".to_string(), Content::Text("ünïcode".to_string()));
        cache.insert(key("/logo.png"), snaps);
        cache.store().unwrap();

        let mut reloaded = CompiledContentCache::at(base);
        reloaded.load(&DiagnosticSink::new()).unwrap();
        let got = reloaded.get(&key("/logo.png")).unwrap();
        assert_eq!(got["last"], Content::Binary(bytes));
        assert_eq!(got["raw"].as_text(), Some("ünïcode"));
    }

    #[test]
    fn prune_keeps_live_reps() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CompiledContentCache::at(dir.path().join("c"));
        cache.insert(key("/a"), Snapshots::new());
        cache.insert(key("/b"), Snapshots::new());
        let live: BTreeSet<RepKey> = [key("/a")].into_iter().collect();
        cache.prune(&live);
        assert!(cache.get(&key("/a")).is_some());
        assert!(cache.get(&key("/b")).is_none());
    }
}
