use quire_store::ChecksumKey;

use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when the attributes checksum differs from the previous run.
pub struct AttributesModified;

impl OutdatednessRule for AttributesModified {
    fn name(&self) -> &str {
        "attributes-modified"
    }

    fn applies_to(&self, _subject: Subject) -> bool {
        true
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let key = ChecksumKey::Attributes(checker.document_of(subject));
        checker
            .context()
            .checksums
            .changed(&key)
            .then_some(Reason::AttributesModified)
    }
}
