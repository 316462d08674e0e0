//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Formats diagnostics for display.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[W301]: store was written by an incompatible version
///   --> checksums
///    = note: the store will be rebuilt at the end of this run
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let ansi = match severity {
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
        };
        format!("{ansi}{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        let header = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity, &header),
            diag.message
        ));

        if let Some(subject) = &diag.subject {
            out.push_str(&format!("  --> {subject}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    #[test]
    fn render_with_subject_and_notes() {
        let diag = Diagnostic::warning(
            DiagnosticCode::STORE_VERSION_MISMATCH,
            "store was written by an incompatible version",
        )
        .with_subject("checksums")
        .with_note("the store will be rebuilt at the end of this run")
        .with_help("no action needed");

        let output = TerminalRenderer::new(false).render(&diag);

        assert!(output.contains("warning[W301]: store was written by an incompatible version"));
        assert!(output.contains("--> checksums"));
        assert!(output.contains("= note: the store will be rebuilt"));
        assert!(output.contains("= help: no action needed"));
    }

    #[test]
    fn render_without_subject() {
        let diag = Diagnostic::warning(DiagnosticCode::FILTER_WARNING, "deprecated filter");
        let output = TerminalRenderer::new(false).render(&diag);
        assert_eq!(output, "warning[W303]: deprecated filter\n");
    }

    #[test]
    fn color_wraps_header() {
        let diag = Diagnostic::note(DiagnosticCode::REP_NOT_ROUTED, "not written");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;36mnote[N304]\x1b[0m: not written"));
    }
}
