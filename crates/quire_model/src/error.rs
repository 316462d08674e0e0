//! Errors raised while building the data model of a run.

use crate::document::DocumentKind;
use quire_common::Identifier;

/// Errors detected while assembling the site or compiling patterns.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Two documents of the same kind share an identifier.
    #[error("duplicate {kind} identifier '{identifier}'")]
    DuplicateIdentifier {
        /// Whether the duplicates are items or layouts.
        kind: DocumentKind,
        /// The shared identifier.
        identifier: Identifier,
    },

    /// A glob or regular expression pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}
