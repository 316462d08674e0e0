use crate::{OutdatednessChecker, OutdatednessRule, Reason, Subject};

/// Fires when an output file of the rep is missing.
pub struct NotWritten;

impl OutdatednessRule for NotWritten {
    fn name(&self) -> &str {
        "not-written"
    }

    fn apply(&self, subject: Subject, checker: &OutdatednessChecker<'_>) -> Option<Reason> {
        let Subject::Rep(id) = subject else {
            return None;
        };
        let ctx = checker.context();
        let memory = ctx.memories.get(id)?;
        memory
            .paths()
            .values()
            .any(|path| !ctx.output_root.join(path.trim_start_matches('/')).is_file())
            .then_some(Reason::NotWritten)
    }
}
