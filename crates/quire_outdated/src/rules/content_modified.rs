use quire_store::ChecksumKey;

use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when the raw content checksum differs from the previous run.
pub struct ContentModified;

impl OutdatednessRule for ContentModified {
    fn name(&self) -> &str {
        "content-modified"
    }

    fn applies_to(&self, _subject: Subject) -> bool {
        true
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let key = ChecksumKey::Content(checker.document_of(subject));
        checker
            .context()
            .checksums
            .changed(&key)
            .then_some(Reason::ContentModified)
    }
}
