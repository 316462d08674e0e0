//! Checksums of documents, configuration and rule code.

use std::collections::BTreeMap;
use std::path::PathBuf;

use quire_common::ContentHash;
use quire_config::{store_path, SiteConfig};
use quire_diagnostics::DiagnosticSink;
use quire_model::{DocumentRef, Site};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::versioned::VersionedStore;

/// What a checksum was taken of.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ChecksumKey {
    /// Raw content of a document.
    Content(DocumentRef),
    /// Attributes of a document.
    Attributes(DocumentRef),
    /// The site configuration.
    Config,
    /// The rule definitions' source.
    Code,
}

/// Checksums from the previous run next to the ones of the current run.
#[derive(Debug)]
pub struct ChecksumStore {
    store: VersionedStore,
    previous: BTreeMap<ChecksumKey, ContentHash>,
    current: BTreeMap<ChecksumKey, ContentHash>,
}

impl ChecksumStore {
    /// Store name.
    pub const NAME: &'static str = "checksums";
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
            previous: BTreeMap::new(),
            current: BTreeMap::new(),
        }
    }

    /// Loads the previous run's checksums.
    pub fn load(&mut self, sink: &DiagnosticSink) -> Result<(), StoreError> {
        self.previous = self.store.load(sink)?.unwrap_or_default();
        Ok(())
    }

    /// Computes the checksums of the current run.
    ///
    /// Documents are hashed in parallel.
    pub fn compute(&mut self, site: &Site, config: &SiteConfig, code: Option<ContentHash>) {
        let refs = site.document_refs();
        let hashed: Vec<(ChecksumKey, ContentHash)> = refs
            .into_par_iter()
            .filter_map(|doc| {
                let document = site.document(&doc)?;
                Some([
                    (ChecksumKey::Content(doc.clone()), document.content_checksum()),
                    (ChecksumKey::Attributes(doc), document.attributes_checksum()),
                ])
            })
            .flat_map_iter(|pair| pair)
            .collect();

        self.current = hashed.into_iter().collect();
        self.current.insert(ChecksumKey::Config, config.checksum());
        if let Some(code) = code {
            self.current.insert(ChecksumKey::Code, code);
        }
        debug!(count = self.current.len(), "computed checksums");
    }

    /// Returns the checksum recorded by the previous run.
    pub fn previous(&self, key: &ChecksumKey) -> Option<ContentHash> {
        self.previous.get(key).copied()
    }

    /// Returns the checksum of the current run.
    pub fn current(&self, key: &ChecksumKey) -> Option<ContentHash> {
        self.current.get(key).copied()
    }

    /// Returns `true` if the checksum differs from the previous run, including
    /// when it is present in only one of the two runs.
    pub fn changed(&self, key: &ChecksumKey) -> bool {
        self.previous(key) != self.current(key)
    }

    /// Persists the current checksums.
    pub fn store(&self) -> Result<(), StoreError> {
        self.store.store(&self.current)
    }
}
