//! Errors raised by filters and by the compiler.

use std::path::PathBuf;

use quire_model::{ModelError, RepId, RepKey};
use quire_rules::RuleError;
use quire_store::StoreError;

/// Errors a filter may return.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The filter needs compiled content of a rep that is not compiled yet.
    ///
    /// Not a failure: the compiler retries the rep once the other is done.
    #[error("compiled content of {0:?} is not available yet")]
    UnmetDependency(RepId),

    /// A referenced document does not exist.
    #[error("no {kind} with identifier '{identifier}'")]
    UnknownDocument {
        /// `item` or `layout`.
        kind: &'static str,
        /// The identifier that was looked up.
        identifier: String,
    },

    /// An item has no rep with this name.
    #[error("item '{item}' has no rep '{rep}'")]
    UnknownRep {
        /// The item identifier.
        item: String,
        /// The rep name.
        rep: String,
    },

    /// A rep has no snapshot with this name.
    #[error("{rep} has no snapshot '{snapshot}'")]
    UnknownSnapshot {
        /// The rep that was read.
        rep: RepKey,
        /// The missing snapshot.
        snapshot: String,
    },

    /// The filter expected text and got binary content, or the reverse.
    #[error("filter '{filter}' cannot process {found} content")]
    WrongContentKind {
        /// The filter name.
        filter: String,
        /// `text` or `binary`.
        found: &'static str,
    },

    /// Any other filter failure.
    #[error("filter '{filter}' failed: {message}")]
    Failed {
        /// The filter name.
        filter: String,
        /// Human-readable cause.
        message: String,
    },
}

/// Errors that abort a compilation run. Stores are not persisted.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The site could not be assembled.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A rule could not be selected or evaluated.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A filter failed while compiling a rep.
    #[error("while compiling {rep}: {source}")]
    Filter {
        /// The rep being compiled.
        rep: RepKey,
        /// The filter error.
        source: FilterError,
    },

    /// A rule memory names a filter no one registered.
    #[error("{rep} uses unknown filter '{filter}'")]
    UnknownFilter {
        /// The rep being compiled.
        rep: RepKey,
        /// The filter name.
        filter: String,
    },

    /// No layout matches the pattern of a `layout` action.
    #[error("{rep} uses unknown layout '{pattern}'")]
    UnknownLayout {
        /// The rep being compiled.
        rep: RepKey,
        /// The layout pattern.
        pattern: String,
    },

    /// No layout filter mapping entry matches a layout.
    #[error("cannot determine the filter for layout '{layout}'")]
    CannotDetermineFilter {
        /// The layout identifier.
        layout: String,
    },

    /// Two snapshots were routed to the same output path.
    #[error("{first} and {second} are both routed to '{path}'")]
    DuplicateRoute {
        /// The shared output path.
        path: String,
        /// The rep and snapshot routed there first.
        first: String,
        /// The rep and snapshot routed there second.
        second: String,
    },

    /// Reps wait on each other's compiled content.
    #[error("recursive compilation: {}", join_keys(.reps))]
    Recursive {
        /// Every rep left uncompiled, in id order.
        reps: Vec<RepKey>,
    },

    /// A rep asked again for a rep that was already compiled.
    #[error("{rep} is already compiled but was reported as unmet")]
    AlreadyCompiled {
        /// The compiled rep.
        rep: RepKey,
    },

    /// An output file could not be written.
    #[error("cannot write {path}: {source}")]
    Io {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

fn join_keys(reps: &[RepKey]) -> String {
    reps.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
