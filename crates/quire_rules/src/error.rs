//! Errors raised while evaluating rules.

use quire_common::Identifier;
use quire_model::RepKey;

/// Configuration errors found while selecting rules or computing rule
/// memories. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// No compile rule matches an item, or none matches one of its reps.
    #[error("no compilation rule matches {item}{}", rep_suffix(.rep))]
    NoMatchingRule {
        /// The item identifier.
        item: Identifier,
        /// The rep name, when a rule matched the item but not this rep.
        rep: Option<String>,
    },

    /// A rule memory takes the same snapshot twice.
    #[error("{rep} takes snapshot '{snapshot}' more than once")]
    DuplicateSnapshot {
        /// The rep.
        rep: RepKey,
        /// The repeated snapshot name.
        snapshot: String,
    },

    /// A routing rule returned a path that does not start with `/`.
    #[error("route of {rep} for snapshot '{snapshot}' is '{path}', which does not start with '/'")]
    NonAbsoluteRoute {
        /// The rep.
        rep: RepKey,
        /// The routed snapshot.
        snapshot: String,
        /// The offending path.
        path: String,
    },

    /// A rule body failed.
    #[error("rule for {rep} failed: {message}")]
    Body {
        /// The rep.
        rep: RepKey,
        /// What went wrong.
        message: String,
    },
}

fn rep_suffix(rep: &Option<String>) -> String {
    rep.as_ref().map(|r| format!(" (rep {r})")).unwrap_or_default()
}
