//! Computes and memoizes the rule memory of each rep.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use quire_config::SiteConfig;
use quire_model::{
    Action, RepId, RepKey, RepTable, RuleMemory, Site, SNAPSHOT_LAST, SNAPSHOT_POST, SNAPSHOT_PRE,
    SNAPSHOT_RAW,
};
use tracing::trace;

use crate::collection::RulesCollection;
use crate::context::{RouteContext, RuleContext};
use crate::error::RuleError;

/// Runs compile rules in recording mode and routes the resulting snapshots.
///
/// Each rep's memory is computed at most once per run.
pub struct RuleMemoryCalculator<'a> {
    rules: &'a RulesCollection,
    site: &'a Site,
    config: &'a SiteConfig,
    memo: HashMap<RepId, RuleMemory>,
}

impl<'a> RuleMemoryCalculator<'a> {
    /// Creates a calculator for one run.
    pub fn new(rules: &'a RulesCollection, site: &'a Site, config: &'a SiteConfig) -> Self {
        Self {
            rules,
            site,
            config,
            memo: HashMap::new(),
        }
    }

    /// Returns the memory of a rep, computing it on first use.
    pub fn memory_for(&mut self, id: RepId, reps: &RepTable) -> Result<&RuleMemory, RuleError> {
        match self.memo.entry(id) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let memory = compute(self.rules, self.site, self.config, id, reps)?;
                Ok(e.insert(memory))
            }
        }
    }

    /// Returns an already computed memory.
    pub fn get(&self, id: RepId) -> Option<&RuleMemory> {
        self.memo.get(&id)
    }
}

fn compute(
    rules: &RulesCollection,
    site: &Site,
    config: &SiteConfig,
    id: RepId,
    reps: &RepTable,
) -> Result<RuleMemory, RuleError> {
    let rep = reps.get(id);
    let item = site.item(rep.item);
    let key = reps.key(id, site);

    let rule = rules
        .compile_rule_for(item.identifier.as_str(), &rep.name)
        .ok_or_else(|| RuleError::NoMatchingRule {
            item: item.identifier.clone(),
            rep: Some(rep.name.clone()),
        })?;

    let mut ctx = RuleContext::new(item, &rep.name, config);
    (rule.body)(&mut ctx)?;
    let mut memory = RuleMemory::new(with_implicit_snapshots(ctx.into_actions()));

    if let Some(name) = memory.duplicate_snapshot() {
        return Err(RuleError::DuplicateSnapshot {
            rep: key,
            snapshot: name.to_string(),
        });
    }

    for action in memory.actions_mut() {
        if let Action::Snapshot { name, path } = action {
            *path = route(rules, config, item, &rep.name, name, &key)?;
        }
    }

    trace!(rep = %key, actions = memory.actions().len(), "rule memory computed");
    Ok(memory)
}

/// Adds `raw` first, `pre` before the first layout (or at the end), `post`
/// at the end when layouts are used, and `last` at the end. Snapshots the
/// rule takes explicitly are not added again.
fn with_implicit_snapshots(recorded: Vec<Action>) -> Vec<Action> {
    let snapshot = |name: &str| Action::Snapshot {
        name: name.to_string(),
        path: None,
    };
    let explicit =
        |name: &str| recorded.iter().any(|a| matches!(a, Action::Snapshot { name: n, .. } if n == name));
    let has_layout = recorded.iter().any(|a| matches!(a, Action::Layout { .. }));

    let mut actions = vec![snapshot(SNAPSHOT_RAW)];
    let mut pre_taken = explicit(SNAPSHOT_PRE);
    for action in &recorded {
        if matches!(action, Action::Layout { .. }) && !pre_taken {
            actions.push(snapshot(SNAPSHOT_PRE));
            pre_taken = true;
        }
        actions.push(action.clone());
    }
    if !pre_taken {
        actions.push(snapshot(SNAPSHOT_PRE));
    }
    if has_layout && !explicit(SNAPSHOT_POST) {
        actions.push(snapshot(SNAPSHOT_POST));
    }
    if !explicit(SNAPSHOT_LAST) {
        actions.push(snapshot(SNAPSHOT_LAST));
    }
    actions
}

fn route(
    rules: &RulesCollection,
    config: &SiteConfig,
    item: &quire_model::Item,
    rep: &str,
    snapshot: &str,
    key: &RepKey,
) -> Result<Option<String>, RuleError> {
    let Some(rule) = rules.routing_rule_for(item.identifier.as_str(), rep, snapshot) else {
        return Ok(None);
    };
    let ctx = RouteContext {
        item,
        rep,
        snapshot,
        config,
    };
    match (rule.body)(&ctx) {
        Some(path) if !path.starts_with('/') => Err(RuleError::NonAbsoluteRoute {
            rep: key.clone(),
            snapshot: snapshot.to_string(),
            path,
        }),
        path => Ok(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::Identifier;
    use quire_model::{Document, ItemId, ItemRep, Params, Pattern};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn glob(s: &str) -> Pattern {
        Pattern::glob(s).unwrap()
    }

    fn setup() -> (Site, RepTable, SiteConfig) {
        let site = Site::new(
            vec![Document::new(Identifier::new("/index.md").unwrap(), "# hi")],
            vec![],
        )
        .unwrap();
        let mut reps = RepTable::new();
        reps.insert(ItemRep::new(ItemId::from_raw(0), "default"));
        (site, reps, SiteConfig::with_defaults("/site"))
    }

    fn names(memory: &RuleMemory) -> Vec<&str> {
        memory.snapshot_names().collect()
    }

    #[test]
    fn implicit_snapshots_without_layout() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |ctx| {
            ctx.filter("markdown", Params::new());
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let memory = calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        assert_eq!(names(memory), vec!["raw", "pre", "last"]);
        assert!(matches!(&memory.actions()[1], Action::Filter { name, .. } if name == "markdown"));
    }

    #[test]
    fn pre_goes_before_first_layout() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |ctx| {
            ctx.filter("erb", Params::new())
                .layout("/a.*", Params::new())
                .filter("erb", Params::new())
                .layout("/b.*", Params::new());
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let memory = calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        assert_eq!(names(memory), vec!["raw", "pre", "post", "last"]);
        assert!(matches!(&memory.actions()[2], Action::Snapshot { name, .. } if name == "pre"));
        assert!(matches!(&memory.actions()[3], Action::Layout { pattern, .. } if pattern == "/a.*"));
    }

    #[test]
    fn explicit_last_is_not_repeated() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |ctx| {
            ctx.snapshot("last").filter("minify", Params::new());
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let memory = calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        assert_eq!(names(memory), vec!["raw", "last", "pre"]);
    }

    #[test]
    fn duplicate_snapshot_is_rejected() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |ctx| {
            ctx.snapshot("aaa").snapshot("aaa");
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let err = calc.memory_for(RepId::from_raw(0), &reps).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateSnapshot { snapshot, .. } if snapshot == "aaa"));
    }

    #[test]
    fn explicit_raw_is_a_duplicate() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |ctx| {
            ctx.snapshot("raw");
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        assert!(calc.memory_for(RepId::from_raw(0), &reps).is_err());
    }

    #[test]
    fn routes_are_attached_to_snapshots() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |_| Ok(()));
        rules.route(glob("/**/*"), |ctx| {
            Some(format!("{}/index.html", ctx.item.identifier.without_extension()))
        });
        rules.route_snapshot(glob("/**/*"), "default", "raw", |_| Some("/src.md".to_string()));
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let memory = calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        let paths = memory.paths();
        assert_eq!(paths["last"], "/index/index.html");
        assert_eq!(paths["raw"], "/src.md");
        assert!(!paths.contains_key("pre"));
    }

    #[test]
    fn relative_route_is_rejected() {
        let (site, reps, config) = setup();
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), |_| Ok(()));
        rules.route(glob("/**/*"), |_| Some("index.html".to_string()));
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let err = calc.memory_for(RepId::from_raw(0), &reps).unwrap_err();
        assert!(matches!(err, RuleError::NonAbsoluteRoute { path, .. } if path == "index.html"));
    }

    #[test]
    fn missing_rule_is_an_error() {
        let (site, reps, config) = setup();
        let rules = RulesCollection::new();
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        let err = calc.memory_for(RepId::from_raw(0), &reps).unwrap_err();
        assert!(matches!(err, RuleError::NoMatchingRule { .. }));
    }

    #[test]
    fn memory_is_computed_once() {
        let (site, reps, config) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut rules = RulesCollection::new();
        rules.compile(glob("/**/*"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let mut calc = RuleMemoryCalculator::new(&rules, &site, &config);
        calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        calc.memory_for(RepId::from_raw(0), &reps).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(calc.get(RepId::from_raw(0)).is_some());
    }
}
