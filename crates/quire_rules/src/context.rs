//! What rule bodies see while they run.

use quire_config::SiteConfig;
use quire_model::{Action, Item, Params};

/// Records the actions of a compile rule instead of executing them.
///
/// Rule bodies must only depend on the item, the rep name and the
/// configuration, so the recorded memory can be compared across runs.
pub struct RuleContext<'a> {
    item: &'a Item,
    rep: &'a str,
    config: &'a SiteConfig,
    actions: Vec<Action>,
}

impl<'a> RuleContext<'a> {
    /// Creates an empty recorder.
    pub fn new(item: &'a Item, rep: &'a str, config: &'a SiteConfig) -> Self {
        Self {
            item,
            rep,
            config,
            actions: Vec::new(),
        }
    }

    /// The item being compiled.
    pub fn item(&self) -> &'a Item {
        self.item
    }

    /// The rep name.
    pub fn rep_name(&self) -> &'a str {
        self.rep
    }

    /// The site configuration.
    pub fn config(&self) -> &'a SiteConfig {
        self.config
    }

    /// Records a filter action.
    pub fn filter(&mut self, name: impl Into<String>, params: Params) -> &mut Self {
        self.actions.push(Action::Filter {
            name: name.into(),
            params,
        });
        self
    }

    /// Records a layout action.
    pub fn layout(&mut self, pattern: impl Into<String>, params: Params) -> &mut Self {
        self.actions.push(Action::Layout {
            pattern: pattern.into(),
            params,
        });
        self
    }

    /// Records a snapshot action.
    pub fn snapshot(&mut self, name: impl Into<String>) -> &mut Self {
        self.actions.push(Action::Snapshot {
            name: name.into(),
            path: None,
        });
        self
    }

    /// The recorded actions.
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// What routing rule bodies see.
pub struct RouteContext<'a> {
    /// The item being routed.
    pub item: &'a Item,
    /// The rep name.
    pub rep: &'a str,
    /// The snapshot being routed.
    pub snapshot: &'a str,
    /// The site configuration.
    pub config: &'a SiteConfig,
}
