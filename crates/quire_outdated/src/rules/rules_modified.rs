use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when the rule memory differs from the stored one.
///
/// A memory that differs only in snapshot paths yields
/// [`Reason::PathsModified`], which leaves compiled content valid.
pub struct RulesModified;

impl OutdatednessRule for RulesModified {
    fn name(&self) -> &str {
        "rules-modified"
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let Subject::Rep(id) = subject else {
            return None;
        };
        let ctx = checker.context();
        let current = ctx.memories.get(id)?;
        match ctx.rule_memories.get(&checker.rep_key(id)) {
            None => Some(Reason::RulesModified),
            Some(previous) if previous == current => None,
            Some(previous) if previous.same_actions_ignoring_paths(current) => {
                Some(Reason::PathsModified)
            }
            Some(_) => Some(Reason::RulesModified),
        }
    }
}
