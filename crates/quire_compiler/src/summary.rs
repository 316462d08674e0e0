//! What a run did.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use quire_diagnostics::{Diagnostic, DiagnosticRenderer};
use quire_model::RepKey;
use quire_outdated::Reason;

/// The result of a successful run.
#[derive(Debug, Default)]
pub struct CompileSummary {
    /// Reps that were recompiled, with the reason they were outdated.
    pub recompiled: BTreeMap<RepKey, Reason>,
    /// Reps whose cached content was reused.
    pub reused: BTreeSet<RepKey>,
    /// Output files whose bytes changed, in write order.
    pub written: Vec<PathBuf>,
    /// Non-fatal findings of the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileSummary {
    /// Returns `true` if the rep was recompiled this run.
    pub fn was_recompiled(&self, rep: &RepKey) -> bool {
        self.recompiled.contains_key(rep)
    }

    /// Renders every diagnostic, one block per diagnostic.
    pub fn render(&self, renderer: &dyn DiagnosticRenderer) -> String {
        self.diagnostics.iter().map(|d| renderer.render(d)).collect()
    }
}

impl std::fmt::Display for CompileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} recompiled, {} reused, {} written",
            self.recompiled.len(),
            self.reused.len(),
            self.written.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::Identifier;
    use quire_diagnostics::{DiagnosticCode, TerminalRenderer};

    #[test]
    fn display_counts() {
        let mut summary = CompileSummary::default();
        let key = RepKey::new(Identifier::new("/a.md").unwrap(), "default");
        summary.recompiled.insert(key.clone(), Reason::DocumentAdded);
        summary.written.push(PathBuf::from("output/a/index.html"));
        assert!(summary.was_recompiled(&key));
        assert_eq!(summary.to_string(), "1 recompiled, 0 reused, 1 written");
    }

    #[test]
    fn render_uses_renderer() {
        let mut summary = CompileSummary::default();
        summary.diagnostics.push(Diagnostic::warning(
            DiagnosticCode::FILTER_WARNING,
            "the 'eruby' filter is deprecated",
        ));
        let text = summary.render(&TerminalRenderer::new(false));
        assert!(text.starts_with("warning[W303]: the 'eruby' filter is deprecated"));
    }
}
