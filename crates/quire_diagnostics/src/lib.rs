//! Diagnostic collection and rendering for a compilation run.
//!
//! Components that can report non-fatal findings (stores recovering from a
//! stale cache, filters emitting warnings) receive a [`DiagnosticSink`]. The
//! compiler drains the sink once the run has finished and hands the
//! diagnostics to the caller, who can format them with a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
