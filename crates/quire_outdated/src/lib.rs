//! Decides which representations must be recompiled, and why.
//!
//! The [`OutdatednessChecker`] runs an ordered list of [`OutdatednessRule`]s
//! against a rep or layout. The first rule that fires gives the [`Reason`];
//! rule order encodes priority, so "document added" beats "content modified".
//!
//! # Rules
//!
//! | order | rule | invalidates |
//! |---|---|---|
//! | 1 | code modified | everything |
//! | 2 | configuration modified | everything |
//! | 3 | document added | everything |
//! | 4 | content modified | raw and compiled content |
//! | 5 | attributes modified | attributes and compiled content |
//! | 6 | rules modified (or only paths) | compiled content and path (or path) |
//! | 7 | not enough data | compiled content |
//! | 8 | not written | compiled content |
//! | 9 | uses always-outdated filter | compiled content |
//! | 10 | dependencies outdated | compiled content |

#![warn(missing_docs)]

mod checker;
mod reason;
mod rules;

pub use checker::{CheckContext, OutdatednessChecker, Subject};
pub use reason::Reason;
pub use rules::register_builtin_rules;
pub use rules::{
    AttributesModified, CodeModified, ConfigurationModified, ContentModified,
    DependenciesOutdated, DocumentAdded, NotEnoughData, NotWritten, RulesModified,
    UsesAlwaysOutdatedFilter,
};

/// A single reason a rep or layout may be outdated.
///
/// Rules that look at the dependency graph report
/// [`uses_dependencies`](Self::uses_dependencies); they are skipped while the
/// checker propagates outdatedness through the graph.
pub trait OutdatednessRule: Send + Sync {
    /// Returns the short kebab-case name of this rule.
    fn name(&self) -> &str;

    /// Returns `true` if the rule checks this kind of subject.
    fn applies_to(&self, subject: Subject) -> bool {
        matches!(subject, Subject::Rep(_))
    }

    /// Returns `true` if the rule reads propagated dependency outdatedness.
    fn uses_dependencies(&self) -> bool {
        false
    }

    /// Returns why the subject is outdated, if this rule says it is.
    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason>;
}
