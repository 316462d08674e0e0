use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when the compiled-content cache lacks a snapshot the rep takes.
pub struct NotEnoughData;

impl OutdatednessRule for NotEnoughData {
    fn name(&self) -> &str {
        "not-enough-data"
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let Subject::Rep(id) = subject else {
            return None;
        };
        let ctx = checker.context();
        let Some(cached) = ctx.compiled.get(&checker.rep_key(id)) else {
            return Some(Reason::NotEnoughData);
        };
        let memory = ctx.memories.get(id)?;
        memory
            .snapshot_names()
            .any(|name| !cached.contains_key(name))
            .then_some(Reason::NotEnoughData)
    }
}
