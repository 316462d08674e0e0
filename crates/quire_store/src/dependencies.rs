//! The document dependency graph recorded while compiling.
//!
//! Edges point from the consumer to the consumed document and carry the set
//! of properties that were actually read. Cycles are legal here; only the
//! scheduler cares about compiled-content cycles between reps.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use quire_config::{store_path, SiteConfig};
use quire_diagnostics::DiagnosticSink;
use quire_model::{DocumentRef, Props};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::StoreError;
use crate::versioned::VersionedStore;

/// What a dependent used of one dependency.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Dependency {
    /// Properties read from the dependency.
    pub props: Props,
    /// The dependent relied on the set or order of documents, such as a list
    /// of all items, and goes stale when documents are added or removed.
    pub ordered: bool,
}

type Edges = BTreeMap<DocumentRef, BTreeMap<DocumentRef, Dependency>>;

#[derive(Default, Serialize, Deserialize)]
struct Persisted {
    documents: BTreeSet<DocumentRef>,
    edges: Edges,
}

/// Dependency edges from the previous run, amended during this one.
#[derive(Debug)]
pub struct DependencyStore {
    store: VersionedStore,
    previous_documents: Option<BTreeSet<DocumentRef>>,
    documents: BTreeSet<DocumentRef>,
    new_documents: BTreeSet<DocumentRef>,
    removed_documents: BTreeSet<DocumentRef>,
    edges: Edges,
}

impl DependencyStore {
    /// Store name.
    pub const NAME: &'static str = "dependencies";
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
            previous_documents: None,
            documents: BTreeSet::new(),
            new_documents: BTreeSet::new(),
            removed_documents: BTreeSet::new(),
            edges: Edges::new(),
        }
    }

    /// Loads the previous run's edges and document list.
    pub fn load(&mut self, sink: &DiagnosticSink) -> Result<(), StoreError> {
        match self.store.load::<Persisted>(sink)? {
            Some(persisted) => {
                self.previous_documents = Some(persisted.documents);
                self.edges = persisted.edges;
            }
            None => {
                self.previous_documents = None;
                self.edges.clear();
            }
        }
        Ok(())
    }

    /// Sets the documents of the current run and derives which are new and
    /// which were removed. Without a previous run every document is new.
    pub fn set_documents(&mut self, documents: impl IntoIterator<Item = DocumentRef>) {
        self.documents = documents.into_iter().collect();
        match &self.previous_documents {
            Some(previous) => {
                self.new_documents = self.documents.difference(previous).cloned().collect();
                self.removed_documents = previous.difference(&self.documents).cloned().collect();
            }
            None => {
                self.new_documents = self.documents.clone();
                self.removed_documents.clear();
            }
        }
        debug!(
            new = self.new_documents.len(),
            removed = self.removed_documents.len(),
            "document set compared with previous run"
        );
    }

    /// Adds an edge, merging with an existing one. Self-edges are ignored.
    pub fn record(
        &mut self,
        dependent: &DocumentRef,
        dependency: &DocumentRef,
        props: Props,
        ordered: bool,
    ) {
        if dependent == dependency {
            return;
        }
        trace!(%dependent, %dependency, ?props, ordered, "dependency recorded");
        let edge = self
            .edges
            .entry(dependent.clone())
            .or_default()
            .entry(dependency.clone())
            .or_default();
        edge.props |= props;
        edge.ordered |= ordered;
    }

    /// Outgoing edges of a document.
    pub fn dependencies_of(
        &self,
        dependent: &DocumentRef,
    ) -> impl Iterator<Item = (&DocumentRef, &Dependency)> {
        self.edges.get(dependent).into_iter().flat_map(|deps| deps.iter())
    }

    /// Every dependent with its outgoing edges.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentRef, &BTreeMap<DocumentRef, Dependency>)> {
        self.edges.iter()
    }

    /// Documents present now but not in the previous run.
    pub fn new_documents(&self) -> &BTreeSet<DocumentRef> {
        &self.new_documents
    }

    /// Documents of the previous run that are gone.
    pub fn removed_documents(&self) -> &BTreeSet<DocumentRef> {
        &self.removed_documents
    }

    /// Returns `true` if the document is new in this run.
    pub fn is_new(&self, doc: &DocumentRef) -> bool {
        self.new_documents.contains(doc)
    }

    /// Returns `true` if any document was added or removed.
    pub fn document_set_changed(&self) -> bool {
        !self.new_documents.is_empty() || !self.removed_documents.is_empty()
    }

    /// Drops every outgoing edge of a document before it is recompiled.
    pub fn forget_dependencies_for(&mut self, dependent: &DocumentRef) {
        if self.edges.remove(dependent).is_some() {
            trace!(%dependent, "dependencies forgotten");
        }
    }

    /// Persists the current document list and the edges of live documents.
    pub fn store(&self) -> Result<(), StoreError> {
        let persisted = Persisted {
            documents: self.documents.clone(),
            edges: self
                .edges
                .iter()
                .filter(|(dependent, _)| self.documents.contains(*dependent))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        self.store.store(&persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::Identifier;

    fn item(s: &str) -> DocumentRef {
        DocumentRef::item(Identifier::new(s).unwrap())
    }

    fn fresh(dir: &std::path::Path) -> DependencyStore {
        let mut store = DependencyStore::at(dir.join("dependencies"));
        store.load(&DiagnosticSink::new()).unwrap();
        store
    }

    #[test]
    fn first_run_everything_is_new() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(dir.path());
        store.set_documents([item("/a"), item("/b")]);
        assert_eq!(store.new_documents().len(), 2);
        assert!(store.removed_documents().is_empty());
    }

    #[test]
    fn edges_merge_props() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(dir.path());
        store.record(&item("/a"), &item("/b"), Props::RAW_CONTENT, false);
        store.record(&item("/a"), &item("/b"), Props::PATH, true);
        let deps: Vec<_> = store.dependencies_of(&item("/a")).collect();
        assert_eq!(deps.len(), 1);
        assert!(deps[0].1.props.contains(Props::RAW_CONTENT | Props::PATH));
        assert!(deps[0].1.ordered);
    }

    #[test]
    fn self_edges_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(dir.path());
        store.record(&item("/a"), &item("/a"), Props::ALL, false);
        assert_eq!(store.dependencies_of(&item("/a")).count(), 0);
    }

    #[test]
    fn cycles_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = fresh(dir.path());
        store.record(&item("/a"), &item("/b"), Props::COMPILED_CONTENT, false);
        store.record(&item("/b"), &item("/a"), Props::COMPILED_CONTENT, false);
        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn second_run_sees_added_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = fresh(dir.path());
        first.set_documents([item("/a"), item("/b")]);
        first.record(&item("/a"), &item("/b"), Props::ATTRIBUTES, false);
        first.store().unwrap();

        let mut second = fresh(dir.path());
        second.set_documents([item("/a"), item("/c")]);
        assert!(second.is_new(&item("/c")));
        assert!(!second.is_new(&item("/a")));
        assert!(second.removed_documents().contains(&item("/b")));
        assert!(second.document_set_changed());
        // the edge to the removed document is still known
        assert_eq!(second.dependencies_of(&item("/a")).count(), 1);
    }

    #[test]
    fn forget_then_store_drops_edges() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = fresh(dir.path());
        first.set_documents([item("/a"), item("/b")]);
        first.record(&item("/a"), &item("/b"), Props::ATTRIBUTES, false);
        first.forget_dependencies_for(&item("/a"));
        first.store().unwrap();

        let second = fresh(dir.path());
        assert_eq!(second.dependencies_of(&item("/a")).count(), 0);
    }

    #[test]
    fn edges_of_removed_dependents_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = fresh(dir.path());
        first.set_documents([item("/a")]);
        first.record(&item("/gone"), &item("/a"), Props::ALL, false);
        first.store().unwrap();

        let second = fresh(dir.path());
        assert_eq!(second.dependencies_of(&item("/gone")).count(), 0);
    }
}
