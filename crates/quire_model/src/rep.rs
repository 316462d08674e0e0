//! Item representations and the per-run table that holds them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use quire_common::Identifier;

use crate::arena::Arena;
use crate::document::Content;
use crate::ids::{ItemId, RepId};
use crate::site::Site;

/// A run-independent key for a representation, used by the persistent stores.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RepKey {
    /// Identifier of the item.
    pub item: Identifier,
    /// Representation name.
    pub rep: String,
}

impl RepKey {
    /// Creates a key.
    pub fn new(item: Identifier, rep: impl Into<String>) -> Self {
        Self {
            item,
            rep: rep.into(),
        }
    }
}

impl fmt::Display for RepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.item, self.rep)
    }
}

/// One named compiled variant of an item.
#[derive(Debug, Clone)]
pub struct ItemRep {
    /// The item this rep belongs to.
    pub item: ItemId,
    /// Representation name, such as `default` or `feed`.
    pub name: String,
    /// Output path per routed snapshot.
    pub paths: BTreeMap<String, String>,
    /// Compiled content per snapshot.
    pub snapshots: BTreeMap<String, Content>,
    /// `true` once the rep has content for this run, fresh or cached.
    pub compiled: bool,
    /// `true` if the rep was actually recompiled this run.
    pub modified: bool,
}

impl ItemRep {
    /// Creates an uncompiled rep.
    pub fn new(item: ItemId, name: impl Into<String>) -> Self {
        Self {
            item,
            name: name.into(),
            paths: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            compiled: false,
            modified: false,
        }
    }

    /// Returns the content of a snapshot.
    pub fn snapshot(&self, name: &str) -> Option<&Content> {
        self.snapshots.get(name)
    }
}

/// All representations of a run, allocated in item then rule order.
#[derive(Debug, Default)]
pub struct RepTable {
    reps: Arena<RepId, ItemRep>,
    index: HashMap<(ItemId, String), RepId>,
}

impl RepTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rep, returning the existing id if the item already has a rep
    /// with that name.
    pub fn insert(&mut self, rep: ItemRep) -> RepId {
        let key = (rep.item, rep.name.clone());
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.reps.alloc(rep);
        self.index.insert(key, id);
        id
    }

    /// Looks up a rep by item and name.
    pub fn find(&self, item: ItemId, name: &str) -> Option<RepId> {
        self.index.get(&(item, name.to_string())).copied()
    }

    /// Returns the reps of an item in allocation order.
    pub fn reps_of(&self, item: ItemId) -> Vec<RepId> {
        self.reps
            .iter()
            .filter(|(_, rep)| rep.item == item)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the rep with the given id.
    pub fn get(&self, id: RepId) -> &ItemRep {
        &self.reps[id]
    }

    /// Returns the rep with the given id mutably.
    pub fn get_mut(&mut self, id: RepId) -> &mut ItemRep {
        &mut self.reps[id]
    }

    /// Iterates over all reps.
    pub fn iter(&self) -> impl Iterator<Item = (RepId, &ItemRep)> {
        self.reps.iter()
    }

    /// All rep ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = RepId> {
        self.reps.ids()
    }

    /// Number of reps.
    pub fn len(&self) -> usize {
        self.reps.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    /// Builds the persistent key of a rep.
    pub fn key(&self, id: RepId, site: &Site) -> RepKey {
        let rep = self.get(id);
        RepKey::new(site.item(rep.item).identifier.clone(), rep.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn insert_is_idempotent_per_name() {
        let mut table = RepTable::new();
        let item = ItemId::from_raw(0);
        let a = table.insert(ItemRep::new(item, "default"));
        let b = table.insert(ItemRep::new(item, "default"));
        let c = table.insert(ItemRep::new(item, "feed"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(item, "feed"), Some(c));
        assert_eq!(table.reps_of(item), vec![a, c]);
    }

    #[test]
    fn key_uses_item_identifier() {
        let site = Site::new(
            vec![Document::new(Identifier::new("/about.md").unwrap(), "hi")],
            vec![],
        )
        .unwrap();
        let mut table = RepTable::new();
        let id = table.insert(ItemRep::new(ItemId::from_raw(0), "default"));
        let key = table.key(id, &site);
        assert_eq!(key.to_string(), "/about.md (default)");
    }
}
