//! The outdatedness checker and the state its rules read.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use quire_model::{DocumentRef, LayoutId, Props, RepId, RepKey, RepTable, Site};
use quire_rules::{RuleMemoryCalculator, RulesCollection};
use quire_store::{ChecksumStore, CompiledContentCache, DependencyStore, RuleMemoryStore};
use tracing::debug;

use crate::reason::Reason;
use crate::rules::register_builtin_rules;
use crate::OutdatednessRule;

/// What an outdatedness rule is asked about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Subject {
    /// A representation of an item.
    Rep(RepId),
    /// A layout.
    Layout(LayoutId),
}

/// Current-run and previous-run state the rules compare.
///
/// Every rule memory of the run must already be computed by `memories`.
pub struct CheckContext<'a> {
    /// The documents of this run.
    pub site: &'a Site,
    /// The reps of this run.
    pub reps: &'a RepTable,
    /// Rules, for resolving layout filters.
    pub rules: &'a RulesCollection,
    /// Rule memories of this run.
    pub memories: &'a RuleMemoryCalculator<'a>,
    /// Checksums of the previous and current run.
    pub checksums: &'a ChecksumStore,
    /// The dependency graph of the previous run.
    pub dependencies: &'a DependencyStore,
    /// Compiled content of the previous run.
    pub compiled: &'a CompiledContentCache,
    /// Rule memories of the previous run.
    pub rule_memories: &'a RuleMemoryStore,
    /// Names of filters marked always-outdated.
    pub always_outdated_filters: &'a BTreeSet<String>,
    /// Where output files are written.
    pub output_root: &'a Path,
}

/// Runs the outdatedness rules in order.
pub struct OutdatednessChecker<'a> {
    ctx: CheckContext<'a>,
    rules: Vec<Box<dyn OutdatednessRule>>,
    stale_dependencies: OnceCell<BTreeMap<DocumentRef, DocumentRef>>,
}

impl<'a> OutdatednessChecker<'a> {
    /// Creates a checker with the built-in rules registered.
    pub fn new(ctx: CheckContext<'a>) -> Self {
        let mut checker = Self {
            ctx,
            rules: Vec::new(),
            stale_dependencies: OnceCell::new(),
        };
        register_builtin_rules(&mut checker);
        checker
    }

    /// Appends a rule. Rules run in registration order.
    pub fn register(&mut self, rule: Box<dyn OutdatednessRule>) {
        self.rules.push(rule);
        self.stale_dependencies = OnceCell::new();
    }

    /// Returns the names of all registered rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// The state the rules read.
    pub fn context(&self) -> &CheckContext<'a> {
        &self.ctx
    }

    /// The document a subject belongs to.
    pub fn document_of(&self, subject: Subject) -> DocumentRef {
        match subject {
            Subject::Rep(id) => {
                let item = self.ctx.reps.get(id).item;
                DocumentRef::item(self.ctx.site.item(item).identifier.clone())
            }
            Subject::Layout(id) => DocumentRef::layout(self.ctx.site.layout(id).identifier.clone()),
        }
    }

    /// The persistent key of a rep.
    pub fn rep_key(&self, id: RepId) -> RepKey {
        self.ctx.reps.key(id, self.ctx.site)
    }

    /// Returns the first reason the subject is outdated, or `None` if its
    /// cached content can be reused.
    pub fn outdatedness_reason(&self, subject: Subject) -> Option<Reason> {
        let reason = self
            .rules
            .iter()
            .filter(|r| r.applies_to(subject))
            .find_map(|r| r.apply(subject, self));
        match &reason {
            Some(reason) => debug!(?subject, %reason, "outdated"),
            None => debug!(?subject, "up to date"),
        }
        reason
    }

    /// Returns `true` if the subject must be recompiled.
    pub fn is_outdated(&self, subject: Subject) -> bool {
        self.outdatedness_reason(subject).is_some()
    }

    /// Returns the outdated dependency that makes `doc` outdated, if any.
    pub fn stale_dependency(&self, doc: &DocumentRef) -> Option<&DocumentRef> {
        self.stale_dependencies
            .get_or_init(|| self.propagate())
            .get(doc)
    }

    /// Properties of a subject invalidated by the rules that do not look at
    /// dependencies. Unlike [`outdatedness_reason`](Self::outdatedness_reason)
    /// this considers every firing rule.
    fn basic_props(&self, subject: Subject) -> Props {
        let mut props = Props::NONE;
        for rule in &self.rules {
            if rule.uses_dependencies() || !rule.applies_to(subject) {
                continue;
            }
            if let Some(reason) = rule.apply(subject, self) {
                props |= reason.props();
            }
        }
        props
    }

    /// Marks dependents outdated until nothing changes.
    ///
    /// A dependent is outdated through an edge when the dependency was
    /// removed, when the edge is ordering-sensitive and documents were added
    /// or removed, or when the dependency's invalidated properties intersect
    /// the edge's. A dependency that is itself outdated through its own
    /// dependencies gets recompiled, so it counts as compiled-content changed.
    fn propagate(&self) -> BTreeMap<DocumentRef, DocumentRef> {
        let mut basic: BTreeMap<DocumentRef, Props> = BTreeMap::new();
        for id in self.ctx.reps.ids() {
            let subject = Subject::Rep(id);
            *basic.entry(self.document_of(subject)).or_default() |= self.basic_props(subject);
        }
        for id in self.ctx.site.layouts().ids() {
            let subject = Subject::Layout(id);
            *basic.entry(self.document_of(subject)).or_default() |= self.basic_props(subject);
        }

        let deps = self.ctx.dependencies;
        let removed = deps.removed_documents();
        let set_changed = deps.document_set_changed();
        let mut stale: BTreeMap<DocumentRef, DocumentRef> = BTreeMap::new();

        loop {
            let mut changed = false;
            for (dependent, edges) in deps.iter() {
                if stale.contains_key(dependent) || !self.ctx.site.contains(dependent) {
                    continue;
                }
                let culprit = edges.iter().find(|(dependency, edge)| {
                    if removed.contains(*dependency) || (edge.ordered && set_changed) {
                        return true;
                    }
                    let mut effective = basic.get(*dependency).copied().unwrap_or_default();
                    if stale.contains_key(*dependency) {
                        effective |= Props::COMPILED_CONTENT;
                    }
                    effective.intersects(edge.props)
                });
                if let Some((dependency, _)) = culprit {
                    stale.insert(dependent.clone(), dependency.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        debug!(count = stale.len(), "documents outdated through dependencies");
        stale
    }
}
