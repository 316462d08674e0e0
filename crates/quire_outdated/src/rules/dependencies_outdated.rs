use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when a document the rep's item depends on changed in a way the item
/// relied on, directly or through further dependencies.
pub struct DependenciesOutdated;

impl OutdatednessRule for DependenciesOutdated {
    fn name(&self) -> &str {
        "dependencies-outdated"
    }

    fn uses_dependencies(&self) -> bool {
        true
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let doc = checker.document_of(subject);
        checker
            .stale_dependency(&doc)
            .map(|dependency| Reason::DependenciesOutdated {
                dependency: dependency.clone(),
            })
    }
}
