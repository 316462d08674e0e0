//! Compile rules, routing rules and the layout filter mapping.

use quire_common::ContentHash;
use quire_model::{Params, Pattern, DEFAULT_REP, SNAPSHOT_LAST};

use crate::context::{RouteContext, RuleContext};
use crate::error::RuleError;

/// The action-producing procedure of a compile rule.
pub type RuleBody = Box<dyn Fn(&mut RuleContext<'_>) -> Result<(), RuleError> + Send + Sync>;

/// The path-producing procedure of a routing rule. `None` means the snapshot
/// is not written.
pub type RouteBody = Box<dyn Fn(&RouteContext<'_>) -> Option<String> + Send + Sync>;

/// Pattern plus rep name plus the procedure recording its actions.
pub struct CompileRule {
    /// Items this rule applies to.
    pub pattern: Pattern,
    /// The rep the rule produces.
    pub rep: String,
    /// The action-producing procedure.
    pub body: RuleBody,
}

/// Pattern plus rep and snapshot names plus the procedure producing a path.
pub struct RoutingRule {
    /// Items this rule applies to.
    pub pattern: Pattern,
    /// The rep the rule routes.
    pub rep: String,
    /// The snapshot the rule routes.
    pub snapshot: String,
    /// The path-producing procedure.
    pub body: RouteBody,
}

/// A layout filter mapping entry: layouts matching `pattern` are applied with
/// `filter` and `params`.
#[derive(Debug, Clone)]
pub struct LayoutFilter {
    /// Layouts this entry applies to.
    pub pattern: Pattern,
    /// Filter used to apply the layout.
    pub filter: String,
    /// Default arguments, overridden by those of the `layout` action.
    pub params: Params,
}

/// Everything the rule evaluator produced for a site.
///
/// Compile and routing rules are searched from the last declared to the
/// first, so a later rule overrides an earlier, broader one. The layout
/// filter mapping is searched in declaration order.
#[derive(Default)]
pub struct RulesCollection {
    compile_rules: Vec<CompileRule>,
    routing_rules: Vec<RoutingRule>,
    layout_filters: Vec<LayoutFilter>,
    source_digest: Option<ContentHash>,
}

impl RulesCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a compile rule for the default rep.
    pub fn compile<F>(&mut self, pattern: Pattern, body: F) -> &mut Self
    where
        F: Fn(&mut RuleContext<'_>) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        self.compile_rep(pattern, DEFAULT_REP, body)
    }

    /// Adds a compile rule for a named rep.
    pub fn compile_rep<F>(&mut self, pattern: Pattern, rep: &str, body: F) -> &mut Self
    where
        F: Fn(&mut RuleContext<'_>) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        self.compile_rules.push(CompileRule {
            pattern,
            rep: rep.to_string(),
            body: Box::new(body),
        });
        self
    }

    /// Adds a routing rule for the `last` snapshot of the default rep.
    pub fn route<F>(&mut self, pattern: Pattern, body: F) -> &mut Self
    where
        F: Fn(&RouteContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.route_snapshot(pattern, DEFAULT_REP, SNAPSHOT_LAST, body)
    }

    /// Adds a routing rule for a rep and snapshot.
    pub fn route_snapshot<F>(
        &mut self,
        pattern: Pattern,
        rep: &str,
        snapshot: &str,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&RouteContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.routing_rules.push(RoutingRule {
            pattern,
            rep: rep.to_string(),
            snapshot: snapshot.to_string(),
            body: Box::new(body),
        });
        self
    }

    /// Adds a layout filter mapping entry.
    pub fn layout(&mut self, pattern: Pattern, filter: &str, params: Params) -> &mut Self {
        self.layout_filters.push(LayoutFilter {
            pattern,
            filter: filter.to_string(),
            params,
        });
        self
    }

    /// Sets the digest of the rule source the evaluator loaded.
    pub fn with_source_digest(&mut self, digest: ContentHash) -> &mut Self {
        self.source_digest = Some(digest);
        self
    }

    /// The compile rule for a rep: the last declared one matching both the
    /// identifier and the rep name.
    pub fn compile_rule_for(&self, identifier: &str, rep: &str) -> Option<&CompileRule> {
        self.compile_rules
            .iter()
            .rev()
            .find(|r| r.rep == rep && r.pattern.matches(identifier))
    }

    /// Rep names an item gets, in declaration order of their rules.
    pub fn rep_names_for(&self, identifier: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for rule in &self.compile_rules {
            if rule.pattern.matches(identifier) && !names.contains(&rule.rep) {
                names.push(rule.rep.clone());
            }
        }
        names
    }

    /// The routing rule for a snapshot of a rep: the last declared match.
    pub fn routing_rule_for(
        &self,
        identifier: &str,
        rep: &str,
        snapshot: &str,
    ) -> Option<&RoutingRule> {
        self.routing_rules.iter().rev().find(|r| {
            r.rep == rep && r.snapshot == snapshot && r.pattern.matches(identifier)
        })
    }

    /// The layout filter mapping entry for a layout: the first declared match.
    pub fn layout_filter_for(&self, layout_identifier: &str) -> Option<&LayoutFilter> {
        self.layout_filters
            .iter()
            .find(|m| m.pattern.matches(layout_identifier))
    }

    /// Digest of the rule definitions.
    ///
    /// Covers the rule patterns, rep and snapshot names, the layout filter
    /// mapping and the source digest supplied by the evaluator. Rule bodies
    /// are opaque and only covered through the source digest.
    pub fn code_digest(&self) -> ContentHash {
        let mut parts: Vec<Vec<u8>> = Vec::new();
        for rule in &self.compile_rules {
            parts.push(format!("compile {} {}", rule.pattern, rule.rep).into_bytes());
        }
        for rule in &self.routing_rules {
            parts.push(
                format!("route {} {} {}", rule.pattern, rule.rep, rule.snapshot).into_bytes(),
            );
        }
        for entry in &self.layout_filters {
            let params = serde_json::to_string(&entry.params.iter().collect::<Vec<_>>())
                .unwrap_or_default();
            parts.push(format!("layout {} {} {params}", entry.pattern, entry.filter).into_bytes());
        }
        if let Some(digest) = self.source_digest {
            parts.push(digest.to_string().into_bytes());
        }
        ContentHash::from_parts(parts.iter().map(Vec::as_slice))
    }
}
