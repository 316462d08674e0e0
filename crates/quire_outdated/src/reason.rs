use quire_model::{DocumentRef, Props};
use std::fmt;

/// Why a rep or layout must be recompiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The rule definitions changed.
    CodeModified,
    /// The site configuration changed.
    ConfigurationModified,
    /// The document did not exist in the previous run.
    DocumentAdded,
    /// The raw content changed.
    ContentModified,
    /// The attributes changed.
    AttributesModified,
    /// The rule memory changed.
    RulesModified,
    /// Only the output paths in the rule memory changed.
    PathsModified,
    /// No cached compiled content is available.
    NotEnoughData,
    /// An output file is missing.
    NotWritten,
    /// A filter whose output is never reusable is used.
    UsesAlwaysOutdatedFilter {
        /// The filter name.
        filter: String,
    },
    /// A dependency changed in a way the rep relied on.
    DependenciesOutdated {
        /// The first outdated dependency found.
        dependency: DocumentRef,
    },
}

impl Reason {
    /// The properties this reason invalidates.
    pub fn props(&self) -> Props {
        match self {
            Reason::CodeModified | Reason::ConfigurationModified | Reason::DocumentAdded => {
                Props::ALL
            }
            Reason::ContentModified => Props::RAW_CONTENT | Props::COMPILED_CONTENT,
            Reason::AttributesModified => Props::ATTRIBUTES | Props::COMPILED_CONTENT,
            Reason::RulesModified => Props::COMPILED_CONTENT | Props::PATH,
            // A missing file changes nothing a reader of the rep saw, except
            // where a changed route points it.
            Reason::PathsModified | Reason::NotWritten => Props::PATH,
            Reason::NotEnoughData
            | Reason::UsesAlwaysOutdatedFilter { .. }
            | Reason::DependenciesOutdated { .. } => Props::COMPILED_CONTENT,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::CodeModified => write!(f, "the rules have been modified"),
            Reason::ConfigurationModified => write!(f, "the site configuration has been modified"),
            Reason::DocumentAdded => write!(f, "the document is new"),
            Reason::ContentModified => write!(f, "the content has been modified"),
            Reason::AttributesModified => write!(f, "the attributes have been modified"),
            Reason::RulesModified => write!(f, "the rule memory has been modified"),
            Reason::PathsModified => write!(f, "the output paths have been modified"),
            Reason::NotEnoughData => write!(f, "no cached compiled content is available"),
            Reason::NotWritten => write!(f, "an output file does not exist"),
            Reason::UsesAlwaysOutdatedFilter { filter } => {
                write!(f, "the always-outdated filter '{filter}' is used")
            }
            Reason::DependenciesOutdated { dependency } => {
                write!(f, "the dependency {dependency} is outdated")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_only_reason_keeps_content() {
        assert!(!Reason::PathsModified.props().intersects(Props::COMPILED_CONTENT));
        assert!(Reason::RulesModified.props().contains(Props::PATH));
    }

    #[test]
    fn missing_output_keeps_content() {
        assert_eq!(Reason::NotWritten.props(), Props::PATH);
    }

    #[test]
    fn added_invalidates_everything() {
        assert_eq!(Reason::DocumentAdded.props(), Props::ALL);
    }

    #[test]
    fn display_names_filter() {
        let r = Reason::UsesAlwaysOutdatedFilter {
            filter: "timestamp".to_string(),
        };
        assert!(r.to_string().contains("'timestamp'"));
    }
}
