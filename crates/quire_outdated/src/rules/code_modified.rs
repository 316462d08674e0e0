use quire_store::ChecksumKey;

use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when the rule definitions changed since the previous run.
pub struct CodeModified;

impl OutdatednessRule for CodeModified {
    fn name(&self) -> &str {
        "code-modified"
    }

    fn applies_to(&self, _subject: Subject) -> bool {
        true
    }

    fn apply(&self, _subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        checker
            .context()
            .checksums
            .changed(&ChecksumKey::Code)
            .then_some(Reason::CodeModified)
    }
}
