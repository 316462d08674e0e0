//! The loaded document set of a run.

use std::collections::HashMap;

use quire_common::Identifier;

use crate::arena::Arena;
use crate::document::{Document, DocumentKind, DocumentRef, Item, Layout};
use crate::error::ModelError;
use crate::ids::{ItemId, LayoutId};
use crate::pattern::Pattern;

/// All items and layouts of a site, in data-source order.
///
/// Built once per run by the (external) data-source layer and immutable
/// afterwards.
#[derive(Debug, Default)]
pub struct Site {
    items: Arena<ItemId, Item>,
    layouts: Arena<LayoutId, Layout>,
    item_index: HashMap<Identifier, ItemId>,
    layout_index: HashMap<Identifier, LayoutId>,
}

impl Site {
    /// Assembles a site, rejecting duplicate identifiers within each kind.
    pub fn new(items: Vec<Item>, layouts: Vec<Layout>) -> Result<Self, ModelError> {
        let mut site = Site::default();
        for item in items {
            if site.item_index.contains_key(&item.identifier) {
                return Err(ModelError::DuplicateIdentifier {
                    kind: DocumentKind::Item,
                    identifier: item.identifier,
                });
            }
            let identifier = item.identifier.clone();
            let id = site.items.alloc(item);
            site.item_index.insert(identifier, id);
        }
        for layout in layouts {
            if site.layout_index.contains_key(&layout.identifier) {
                return Err(ModelError::DuplicateIdentifier {
                    kind: DocumentKind::Layout,
                    identifier: layout.identifier,
                });
            }
            let identifier = layout.identifier.clone();
            let id = site.layouts.alloc(layout);
            site.layout_index.insert(identifier, id);
        }
        Ok(site)
    }

    /// Returns the item table.
    pub fn items(&self) -> &Arena<ItemId, Item> {
        &self.items
    }

    /// Returns the layout table.
    pub fn layouts(&self) -> &Arena<LayoutId, Layout> {
        &self.layouts
    }

    /// Returns the item with the given id.
    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id]
    }

    /// Returns the layout with the given id.
    pub fn layout(&self, id: LayoutId) -> &Layout {
        &self.layouts[id]
    }

    /// Looks up an item by identifier.
    pub fn item_id(&self, identifier: &Identifier) -> Option<ItemId> {
        self.item_index.get(identifier).copied()
    }

    /// Looks up a layout by identifier.
    pub fn layout_id(&self, identifier: &Identifier) -> Option<LayoutId> {
        self.layout_index.get(identifier).copied()
    }

    /// Returns the first layout, in declaration order, matching the pattern.
    pub fn find_layout(&self, pattern: &Pattern) -> Option<LayoutId> {
        self.layouts
            .position(|l| pattern.matches(l.identifier.as_str()))
    }

    /// Resolves a document reference against the current document set.
    pub fn document(&self, doc: &DocumentRef) -> Option<&Document> {
        match doc.kind {
            DocumentKind::Item => self.item_id(&doc.identifier).map(|id| self.item(id)),
            DocumentKind::Layout => self.layout_id(&doc.identifier).map(|id| self.layout(id)),
            DocumentKind::Collection => None,
        }
    }

    /// Returns `true` if the referenced document exists in this run.
    pub fn contains(&self, doc: &DocumentRef) -> bool {
        self.document(doc).is_some()
    }

    /// References to every document, items first, in declaration order.
    pub fn document_refs(&self) -> Vec<DocumentRef> {
        self.items
            .values()
            .map(|i| DocumentRef::item(i.identifier.clone()))
            .chain(
                self.layouts
                    .values()
                    .map(|l| DocumentRef::layout(l.identifier.clone())),
            )
            .collect()
    }
}
