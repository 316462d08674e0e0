use quire_store::ChecksumKey;

use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when `quire.toml` settings or params changed.
pub struct ConfigurationModified;

impl OutdatednessRule for ConfigurationModified {
    fn name(&self) -> &str {
        "configuration-modified"
    }

    fn applies_to(&self, _subject: Subject) -> bool {
        true
    }

    fn apply(&self, _subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        checker
            .context()
            .checksums
            .changed(&ChecksumKey::Config)
            .then_some(Reason::ConfigurationModified)
    }
}
