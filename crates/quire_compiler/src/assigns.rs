//! What a filter can see while it runs, and the dependencies it creates by
//! looking.

use quire_common::Identifier;
use quire_config::SiteConfig;
use quire_model::{
    Content, DocumentRef, Item, ItemId, Layout, LayoutId, Pattern, Props, RepId, RepTable, Site,
    SNAPSHOT_LAST, SNAPSHOT_PRE,
};
use quire_store::Snapshots;

use crate::error::FilterError;

/// A dependency a filter created by reading another document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Recorded {
    pub dependency: DocumentRef,
    pub props: Props,
    pub ordered: bool,
}

/// The state handed to a filter.
///
/// Reading another document through these accessors records a dependency of
/// the current item on it, so the next run knows what to invalidate. Asking
/// for compiled content of a rep that is not compiled yet returns
/// [`FilterError::UnmetDependency`], which the filter should propagate.
pub struct Assigns<'a> {
    site: &'a Site,
    reps: &'a RepTable,
    config: &'a SiteConfig,
    rep: RepId,
    own: &'a Snapshots,
    layout: Option<(LayoutId, &'a Content)>,
    recorded: Vec<Recorded>,
    warnings: Vec<String>,
}

impl<'a> Assigns<'a> {
    pub(crate) fn new(
        site: &'a Site,
        reps: &'a RepTable,
        config: &'a SiteConfig,
        rep: RepId,
        own: &'a Snapshots,
    ) -> Self {
        Self {
            site,
            reps,
            config,
            rep,
            own,
            layout: None,
            recorded: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Sets the layout being applied and the content it wraps.
    pub(crate) fn with_layout(mut self, layout: LayoutId, content: &'a Content) -> Self {
        self.layout = Some((layout, content));
        self
    }

    /// The item being compiled.
    pub fn item(&self) -> &'a Item {
        self.site.item(self.item_id())
    }

    /// Name of the rep being compiled.
    pub fn rep_name(&self) -> &'a str {
        &self.reps.get(self.rep).name
    }

    /// The site configuration.
    pub fn config(&self) -> &'a SiteConfig {
        self.config
    }

    /// The layout being applied, if this filter runs for a `layout` action.
    pub fn layout(&self) -> Option<&'a Layout> {
        self.layout.map(|(id, _)| self.site.layout(id))
    }

    /// The content a layout wraps.
    pub fn yielded(&self) -> Option<&'a Content> {
        self.layout.map(|(_, content)| content)
    }

    /// A snapshot the current rep has already taken.
    pub fn own_snapshot(&self, snapshot: &str) -> Option<&'a Content> {
        self.own.get(snapshot)
    }

    /// Identifiers of every item matching `pattern`, in site order.
    ///
    /// The result depends on which items exist, so an ordering-sensitive
    /// dependency on the item collection is recorded, even when nothing
    /// matches.
    pub fn identifiers_matching(&mut self, pattern: &Pattern) -> Vec<&'a Identifier> {
        let site = self.site;
        self.record(DocumentRef::item_collection(), Props::NONE, true);
        site.items()
            .values()
            .map(|item| &item.identifier)
            .filter(|id| pattern.matches(id.as_str()))
            .collect()
    }

    /// Raw content of an item.
    pub fn raw_content_of(&mut self, identifier: &str) -> Result<&'a Content, FilterError> {
        let item = self.lookup_item(identifier)?;
        let item = self.site.item(item);
        self.record(DocumentRef::item(item.identifier.clone()), Props::RAW_CONTENT, false);
        Ok(&item.content)
    }

    /// An attribute of an item.
    pub fn attribute_of(
        &mut self,
        identifier: &str,
        key: &str,
    ) -> Result<Option<&'a serde_json::Value>, FilterError> {
        let item = self.lookup_item(identifier)?;
        let item = self.site.item(item);
        self.record(DocumentRef::item(item.identifier.clone()), Props::ATTRIBUTES, false);
        Ok(item.attribute(key))
    }

    /// Output path of the `last` snapshot of a rep.
    pub fn path_of(&mut self, identifier: &str, rep: &str) -> Result<Option<&'a str>, FilterError> {
        let id = self.lookup_rep(identifier, rep)?;
        let doc = DocumentRef::item(self.site.item(self.reps.get(id).item).identifier.clone());
        self.record(doc, Props::PATH, false);
        let reps = self.reps;
        Ok(reps.get(id).paths.get(SNAPSHOT_LAST).map(String::as_str))
    }

    /// Compiled content of a rep at `snapshot`, `pre` when not given.
    ///
    /// Reading the current rep's own earlier snapshots creates no dependency.
    pub fn compiled_content_of(
        &mut self,
        identifier: &str,
        rep: &str,
        snapshot: Option<&str>,
    ) -> Result<&'a Content, FilterError> {
        let snapshot = snapshot.unwrap_or(SNAPSHOT_PRE);
        let id = self.lookup_rep(identifier, rep)?;
        let site = self.site;
        let reps = self.reps;
        let own = self.own;

        let found = if id == self.rep {
            own.get(snapshot)
        } else {
            let target = reps.get(id);
            self.record(
                DocumentRef::item(site.item(target.item).identifier.clone()),
                Props::COMPILED_CONTENT,
                false,
            );
            if !target.compiled {
                return Err(FilterError::UnmetDependency(id));
            }
            target.snapshot(snapshot)
        };
        found.ok_or_else(|| FilterError::UnknownSnapshot {
            rep: reps.key(id, site),
            snapshot: snapshot.to_string(),
        })
    }

    /// Reports a non-fatal problem. It surfaces as a diagnostic of the run.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub(crate) fn into_parts(self) -> (Vec<Recorded>, Vec<String>) {
        (self.recorded, self.warnings)
    }

    fn item_id(&self) -> ItemId {
        self.reps.get(self.rep).item
    }

    fn record(&mut self, dependency: DocumentRef, props: Props, ordered: bool) {
        self.recorded.push(Recorded {
            dependency,
            props,
            ordered,
        });
    }

    fn lookup_item(&self, identifier: &str) -> Result<ItemId, FilterError> {
        Identifier::new(identifier)
            .ok()
            .and_then(|id| self.site.item_id(&id))
            .ok_or_else(|| FilterError::UnknownDocument {
                kind: "item",
                identifier: identifier.to_string(),
            })
    }

    fn lookup_rep(&self, identifier: &str, rep: &str) -> Result<RepId, FilterError> {
        let item = self.lookup_item(identifier)?;
        self.reps
            .find(item, rep)
            .ok_or_else(|| FilterError::UnknownRep {
                item: identifier.to_string(),
                rep: rep.to_string(),
            })
    }
}
