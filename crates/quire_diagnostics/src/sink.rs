//! Thread-safe diagnostic collector shared by the components of a run.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics emitted while a site is compiled.
///
/// Components that may report a non-fatal finding borrow the sink; the
/// compiler drains it with [`take_all`](Self::take_all) when the run is over.
/// Emitting only needs `&self`, so the sink may be shared across threads.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.lock().push(diag);
    }

    /// Number of held diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|d| d.severity == severity).count()
    }

    /// Number of held diagnostics.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything reported so far, in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    // A panicking emitter cannot leave the vector half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
