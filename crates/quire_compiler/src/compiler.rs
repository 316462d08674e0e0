//! One compilation run, from loading stores to persisting them.
//!
//! 1. Load the stores and compute this run's checksums
//! 2. Create reps and compute every rule memory, claiming output paths
//! 3. Decide which reps are outdated; reuse cached content for the rest
//! 4. Compile outdated reps in the order the selector discovers
//! 5. Persist the stores, only if every step succeeded

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use quire_config::SiteConfig;
use quire_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use quire_model::{
    Action, Content, DocumentRef, Item, ItemId, ItemRep, Layout, LayoutId, Params, Pattern,
    Props, RepId, RepKey, RepTable, RuleMemory, Site,
};
use quire_outdated::{CheckContext, OutdatednessChecker, Reason, Subject};
use quire_rules::{RuleError, RuleMemoryCalculator, RulesCollection};
use quire_store::{
    ChecksumStore, CompiledContentCache, DependencyStore, RuleMemoryStore, Snapshots,
};
use tracing::{debug, info, trace};

use crate::assigns::Assigns;
use crate::error::{CompileError, FilterError};
use crate::filter::{Filter, FilterRegistry};
use crate::router::RouteTable;
use crate::selector::{Attempt, ItemRepSelector, SelectError};
use crate::summary::CompileSummary;

/// Compiles sites with a fixed configuration, rule set and filter set.
pub struct Compiler {
    config: SiteConfig,
    rules: RulesCollection,
    filters: FilterRegistry,
}

impl Compiler {
    /// Creates a compiler.
    pub fn new(config: SiteConfig, rules: RulesCollection, filters: FilterRegistry) -> Self {
        Self {
            config,
            rules,
            filters,
        }
    }

    /// The site configuration.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Assembles a site from documents and compiles it.
    pub fn compile_documents(
        &self,
        items: Vec<Item>,
        layouts: Vec<Layout>,
    ) -> Result<CompileSummary, CompileError> {
        let site = Site::new(items, layouts)?;
        self.compile(&site)
    }

    /// Runs one incremental compilation of `site`.
    pub fn compile(&self, site: &Site) -> Result<CompileSummary, CompileError> {
        info!(
            items = site.items().len(),
            layouts = site.layouts().len(),
            "compiling site"
        );
        let sink = DiagnosticSink::new();
        let config = &self.config;

        let mut checksums = ChecksumStore::new(config);
        checksums.load(&sink)?;
        checksums.compute(site, config, Some(self.rules.code_digest()));
        let mut dependencies = DependencyStore::new(config);
        dependencies.load(&sink)?;
        dependencies.set_documents(site.document_refs());
        let mut compiled = CompiledContentCache::new(config);
        compiled.load(&sink)?;
        let mut rule_memories = RuleMemoryStore::new(config);
        rule_memories.load(&sink)?;

        let mut reps = build_reps(site, &self.rules)?;
        let mut calc = RuleMemoryCalculator::new(&self.rules, site, config);
        assign_paths(site, &mut reps, &mut calc, &sink)?;

        let always_outdated = self.filters.always_outdated();
        let output_root = config.output_root();
        let mut outdated: BTreeMap<RepId, Reason> = {
            let checker = OutdatednessChecker::new(CheckContext {
                site,
                reps: &reps,
                rules: &self.rules,
                memories: &calc,
                checksums: &checksums,
                dependencies: &dependencies,
                compiled: &compiled,
                rule_memories: &rule_memories,
                always_outdated_filters: &always_outdated,
                output_root: &output_root,
            });
            reps.ids()
                .filter_map(|id| {
                    checker
                        .outdatedness_reason(Subject::Rep(id))
                        .map(|reason| (id, reason))
                })
                .collect()
        };

        let mut summary = CompileSummary::default();
        let ids: Vec<RepId> = reps.ids().collect();
        for id in ids {
            if outdated.contains_key(&id) {
                continue;
            }
            let key = reps.key(id, site);
            match compiled.get(&key) {
                Some(snapshots) => {
                    let rep = reps.get_mut(id);
                    rep.snapshots = snapshots.clone();
                    rep.compiled = true;
                    summary.reused.insert(key);
                }
                None => {
                    outdated.insert(id, Reason::NotEnoughData);
                }
            }
        }
        debug!(
            outdated = outdated.len(),
            reused = summary.reused.len(),
            "outdatedness decided"
        );

        let mut run = Run {
            site,
            config,
            rules: &self.rules,
            filters: &self.filters,
            sink: &sink,
            output_root: &output_root,
            reps,
            calc,
            dependencies,
            compiled,
            rule_memories,
            outdated,
            forgotten: BTreeSet::new(),
            warnings: Vec::new(),
            summary,
        };
        let selector = ItemRepSelector::new(run.reps.ids());
        selector
            .run(|id| run.attempt(id))
            .map_err(|e| run.select_error(e))?;

        let Run {
            reps,
            dependencies,
            mut compiled,
            mut rule_memories,
            mut summary,
            ..
        } = run;
        let live: BTreeSet<RepKey> = reps.ids().map(|id| reps.key(id, site)).collect();
        compiled.prune(&live);
        rule_memories.prune(&live);
        checksums.store()?;
        dependencies.store()?;
        compiled.store()?;
        rule_memories.store()?;

        summary.diagnostics = sink.take_all();
        info!(%summary, "compilation finished");
        Ok(summary)
    }
}

/// One rep per (item, matching rule rep name). Items without rules fail.
fn build_reps(site: &Site, rules: &RulesCollection) -> Result<RepTable, RuleError> {
    let mut reps = RepTable::new();
    for (id, item) in site.items().iter() {
        let names = rules.rep_names_for(item.identifier.as_str());
        if names.is_empty() {
            return Err(RuleError::NoMatchingRule {
                item: item.identifier.clone(),
                rep: None,
            });
        }
        for name in names {
            reps.insert(ItemRep::new(id, name));
        }
    }
    Ok(reps)
}

/// Computes every rule memory and routes its snapshots, before any filter
/// runs.
fn assign_paths(
    site: &Site,
    reps: &mut RepTable,
    calc: &mut RuleMemoryCalculator<'_>,
    sink: &DiagnosticSink,
) -> Result<(), CompileError> {
    let mut routes = RouteTable::new();
    let ids: Vec<RepId> = reps.ids().collect();
    for id in ids {
        let key = reps.key(id, site);
        let paths = calc.memory_for(id, reps)?.paths();
        for (snapshot, path) in &paths {
            routes.claim(path, &key, snapshot)?;
        }
        if paths.is_empty() {
            sink.emit(
                Diagnostic::note(
                    DiagnosticCode::REP_NOT_ROUTED,
                    "representation has no output path and is not written",
                )
                .with_subject(key.to_string()),
            );
        }
        reps.get_mut(id).paths = paths;
    }
    debug!(paths = routes.len(), "output paths assigned");
    Ok(())
}

enum Step {
    Done(Content),
    Pending(RepId),
}

/// Mutable state of a run while reps are being compiled.
struct Run<'a> {
    site: &'a Site,
    config: &'a SiteConfig,
    rules: &'a RulesCollection,
    filters: &'a FilterRegistry,
    sink: &'a DiagnosticSink,
    output_root: &'a Path,
    reps: RepTable,
    calc: RuleMemoryCalculator<'a>,
    dependencies: DependencyStore,
    compiled: CompiledContentCache,
    rule_memories: RuleMemoryStore,
    outdated: BTreeMap<RepId, Reason>,
    forgotten: BTreeSet<ItemId>,
    /// Filter warnings of the current attempt, emitted once the rep is done.
    warnings: Vec<Diagnostic>,
    summary: CompileSummary,
}

impl<'a> Run<'a> {
    fn attempt(&mut self, id: RepId) -> Result<Attempt<RepId>, CompileError> {
        if self.reps.get(id).compiled {
            return Ok(Attempt::Ready);
        }
        let site = self.site;
        let key = self.reps.key(id, site);
        let item_id = self.reps.get(id).item;
        let item = site.item(item_id);
        let doc = DocumentRef::item(item.identifier.clone());
        self.warnings.clear();

        // Dependencies are rediscovered by the filters below.
        if self.forgotten.insert(item_id) {
            self.dependencies.forget_dependencies_for(&doc);
        }

        let memory = self.calc.memory_for(id, &self.reps)?.clone();
        debug!(rep = %key, "compiling");

        let mut snapshots = Snapshots::new();
        let mut content = item.content.clone();
        for action in memory.actions() {
            let step = match action {
                Action::Snapshot { name, .. } => {
                    snapshots.insert(name.clone(), content.clone());
                    continue;
                }
                Action::Filter { name, params } => {
                    self.filter(id, &key, &doc, name, params, &content, &snapshots)?
                }
                Action::Layout { pattern, params } => {
                    self.layout(id, &key, &doc, pattern, params, &content, &snapshots)?
                }
            };
            content = match step {
                Step::Done(content) => content,
                Step::Pending(other) => {
                    debug!(rep = %key, awaits = ?other, "compiled content not available yet");
                    return Ok(Attempt::Pending(other));
                }
            };
        }

        self.finish(id, key, memory, snapshots)?;
        Ok(Attempt::Ready)
    }

    #[allow(clippy::too_many_arguments)]
    fn filter(
        &mut self,
        id: RepId,
        key: &RepKey,
        doc: &DocumentRef,
        name: &str,
        params: &Params,
        content: &Content,
        own: &Snapshots,
    ) -> Result<Step, CompileError> {
        let filters = self.filters;
        let filter = filters
            .get(name)
            .ok_or_else(|| CompileError::UnknownFilter {
                rep: key.clone(),
                filter: name.to_string(),
            })?;
        self.run_filter(id, key, doc, name, filter, content, params, own, None)
    }

    #[allow(clippy::too_many_arguments)]
    fn layout(
        &mut self,
        id: RepId,
        key: &RepKey,
        doc: &DocumentRef,
        pattern: &str,
        params: &Params,
        content: &Content,
        own: &Snapshots,
    ) -> Result<Step, CompileError> {
        let site = self.site;
        let layout_id = site
            .find_layout(&Pattern::glob(pattern)?)
            .ok_or_else(|| CompileError::UnknownLayout {
                rep: key.clone(),
                pattern: pattern.to_string(),
            })?;
        let layout = site.layout(layout_id);
        let entry = self
            .rules
            .layout_filter_for(layout.identifier.as_str())
            .ok_or_else(|| CompileError::CannotDetermineFilter {
                layout: layout.identifier.to_string(),
            })?;
        let filters = self.filters;
        let filter = filters
            .get(&entry.filter)
            .ok_or_else(|| CompileError::UnknownFilter {
                rep: key.clone(),
                filter: entry.filter.clone(),
            })?;
        let params = entry.params.merged_with(params);

        trace!(rep = %key, layout = %layout.identifier, filter = %entry.filter, "applying layout");
        self.dependencies.record(
            doc,
            &DocumentRef::layout(layout.identifier.clone()),
            Props::RAW_CONTENT | Props::ATTRIBUTES,
            false,
        );
        self.run_filter(
            id,
            key,
            doc,
            &entry.filter,
            filter,
            &layout.content,
            &params,
            own,
            Some((layout_id, content)),
        )
    }

    /// Runs a filter, then records the dependencies it created and holds
    /// the warnings it reported until the attempt completes.
    #[allow(clippy::too_many_arguments)]
    fn run_filter(
        &mut self,
        id: RepId,
        key: &RepKey,
        doc: &DocumentRef,
        name: &str,
        filter: &dyn Filter,
        input: &Content,
        params: &Params,
        own: &Snapshots,
        layout: Option<(LayoutId, &Content)>,
    ) -> Result<Step, CompileError> {
        let mut assigns = Assigns::new(self.site, &self.reps, self.config, id, own);
        if let Some((layout, yielded)) = layout {
            assigns = assigns.with_layout(layout, yielded);
        }
        let result = filter.run(input, params, &mut assigns);
        let (recorded, warnings) = assigns.into_parts();

        for dep in recorded {
            self.dependencies
                .record(doc, &dep.dependency, dep.props, dep.ordered);
        }
        self.warnings.extend(warnings.into_iter().map(|warning| {
            Diagnostic::warning(DiagnosticCode::FILTER_WARNING, warning)
                .with_subject(key.to_string())
                .with_note(format!("reported by filter '{name}'"))
        }));

        match result {
            Ok(content) => Ok(Step::Done(content)),
            Err(FilterError::UnmetDependency(other)) => Ok(Step::Pending(other)),
            Err(source) => Err(CompileError::Filter {
                rep: key.clone(),
                source,
            }),
        }
    }

    /// Writes routed snapshots and records the rep as compiled.
    fn finish(
        &mut self,
        id: RepId,
        key: RepKey,
        memory: RuleMemory,
        snapshots: Snapshots,
    ) -> Result<(), CompileError> {
        for (snapshot, path) in &self.reps.get(id).paths {
            let Some(content) = snapshots.get(snapshot) else {
                continue;
            };
            let file = self.output_root.join(path.trim_start_matches('/'));
            if write_if_changed(&file, content.as_bytes())? {
                trace!(rep = %key, path = %file.display(), "written");
                self.summary.written.push(file);
            }
        }

        for warning in self.warnings.drain(..) {
            self.sink.emit(warning);
        }

        let rep = self.reps.get_mut(id);
        rep.snapshots = snapshots.clone();
        rep.compiled = true;
        rep.modified = true;

        if let Some(reason) = self.outdated.remove(&id) {
            debug!(rep = %key, %reason, "compiled");
            self.summary.recompiled.insert(key.clone(), reason);
        }
        self.compiled.insert(key.clone(), snapshots);
        self.rule_memories.insert(key, memory);
        Ok(())
    }

    fn select_error(&self, err: SelectError<RepId, CompileError>) -> CompileError {
        match err {
            SelectError::Compile(err) => err,
            SelectError::Recursive(ids) => CompileError::Recursive {
                reps: ids.into_iter().map(|id| self.reps.key(id, self.site)).collect(),
            },
            SelectError::AlreadyCompiled(id) => CompileError::AlreadyCompiled {
                rep: self.reps.key(id, self.site),
            },
        }
    }
}

/// Writes `bytes` unless the file already holds exactly them. Returns
/// whether the file was written.
fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<bool, CompileError> {
    if std::fs::read(path).is_ok_and(|old| old == bytes) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CompileError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| CompileError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    Ok(true)
}
