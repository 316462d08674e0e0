use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires for items and layouts that did not exist in the previous run.
pub struct DocumentAdded;

impl OutdatednessRule for DocumentAdded {
    fn name(&self) -> &str {
        "document-added"
    }

    fn applies_to(&self, _subject: Subject) -> bool {
        true
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let doc = checker.document_of(subject);
        checker
            .context()
            .dependencies
            .is_new(&doc)
            .then_some(Reason::DocumentAdded)
    }
}
