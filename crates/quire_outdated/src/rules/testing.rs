//! A site with stores, for exercising the rules across two runs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use quire_common::Identifier;
use quire_config::SiteConfig;
use quire_diagnostics::DiagnosticSink;
use quire_model::{Document, ItemRep, Params, Pattern, RepTable, Site};
use quire_rules::{RuleMemoryCalculator, RulesCollection};
use quire_store::{ChecksumStore, CompiledContentCache, DependencyStore, RuleMemoryStore};

use crate::{CheckContext, OutdatednessChecker};

pub(crate) fn doc(identifier: &str, content: &str) -> Document {
    Document::new(Identifier::new(identifier).unwrap(), content)
}

/// Compiles everything with `erb`, wraps it in `/default.*` when
/// `with_layout`, and routes `/x.md` to `/x/index.html`.
pub(crate) fn rules(with_layout: bool) -> RulesCollection {
    let mut rules = RulesCollection::new();
    rules.compile(Pattern::glob("/**/*").unwrap(), move |ctx| {
        ctx.filter("erb", Params::new());
        if with_layout {
            ctx.layout("/default.*", Params::new());
        }
        Ok(())
    });
    rules.route(Pattern::glob("/**/*").unwrap(), |ctx| {
        Some(format!("{}/index.html", ctx.item.identifier.without_extension()))
    });
    rules.layout(Pattern::glob("/**/*").unwrap(), "erb", Params::new());
    rules
}

pub(crate) struct Fixture {
    pub site: Site,
    pub reps: RepTable,
    pub rules: RulesCollection,
    pub config: SiteConfig,
    pub checksums: ChecksumStore,
    pub dependencies: DependencyStore,
    pub compiled: CompiledContentCache,
    pub rule_memories: RuleMemoryStore,
    pub always_outdated: BTreeSet<String>,
}

impl Fixture {
    /// Loads the stores the previous fixture in `dir` persisted.
    pub fn new(
        dir: &Path,
        items: Vec<Document>,
        layouts: Vec<Document>,
        rules: RulesCollection,
    ) -> Self {
        let sink = DiagnosticSink::new();
        let site = Site::new(items, layouts).unwrap();
        let config = SiteConfig::with_defaults(dir);

        let mut reps = RepTable::new();
        for (id, item) in site.items().iter() {
            for name in rules.rep_names_for(item.identifier.as_str()) {
                reps.insert(ItemRep::new(id, name));
            }
        }

        let mut checksums = ChecksumStore::new(&config);
        checksums.load(&sink).unwrap();
        checksums.compute(&site, &config, Some(rules.code_digest()));
        let mut dependencies = DependencyStore::new(&config);
        dependencies.load(&sink).unwrap();
        dependencies.set_documents(site.document_refs());
        let mut compiled = CompiledContentCache::new(&config);
        compiled.load(&sink).unwrap();
        let mut rule_memories = RuleMemoryStore::new(&config);
        rule_memories.load(&sink).unwrap();

        Self {
            site,
            reps,
            rules,
            config,
            checksums,
            dependencies,
            compiled,
            rule_memories,
            always_outdated: BTreeSet::new(),
        }
    }

    pub fn check<R>(&self, f: impl FnOnce(&OutdatednessChecker<'_>) -> R) -> R {
        let mut calc = RuleMemoryCalculator::new(&self.rules, &self.site, &self.config);
        for id in self.reps.ids() {
            calc.memory_for(id, &self.reps).unwrap();
        }
        let output_root = self.config.output_root();
        let checker = OutdatednessChecker::new(CheckContext {
            site: &self.site,
            reps: &self.reps,
            rules: &self.rules,
            memories: &calc,
            checksums: &self.checksums,
            dependencies: &self.dependencies,
            compiled: &self.compiled,
            rule_memories: &self.rule_memories,
            always_outdated_filters: &self.always_outdated,
            output_root: &output_root,
        });
        f(&checker)
    }

    /// Finishes the run as if every rep was compiled: caches content and
    /// memories, writes outputs and stores everything.
    pub fn persist(&mut self) {
        let mut calc = RuleMemoryCalculator::new(&self.rules, &self.site, &self.config);
        let output_root = self.config.output_root();
        for id in self.reps.ids() {
            let memory = calc.memory_for(id, &self.reps).unwrap().clone();
            let key = self.reps.key(id, &self.site);
            let content = self.site.item(self.reps.get(id).item).content.clone();
            let snapshots: BTreeMap<String, _> = memory
                .snapshot_names()
                .map(|name| (name.to_string(), content.clone()))
                .collect();
            for path in memory.paths().values() {
                let file = output_root.join(path.trim_start_matches('/'));
                std::fs::create_dir_all(file.parent().unwrap()).unwrap();
                std::fs::write(file, content.as_bytes()).unwrap();
            }
            self.compiled.insert(key.clone(), snapshots);
            self.rule_memories.insert(key, memory);
        }
        self.checksums.store().unwrap();
        self.dependencies.store().unwrap();
        self.compiled.store().unwrap();
        self.rule_memories.store().unwrap();
    }
}
