//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Warnings, prefixed with `W`.
    Warning,
    /// Informational notes, prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A diagnostic code such as `W301`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// A store was written by an incompatible version and was ignored.
    pub const STORE_VERSION_MISMATCH: Self = Self::new(Category::Warning, 301);
    /// A corrupt store was deleted before loading.
    pub const STORE_PURGED: Self = Self::new(Category::Warning, 302);
    /// A filter reported a warning while running.
    pub const FILTER_WARNING: Self = Self::new(Category::Warning, 303);
    /// A representation has no output path and is not written.
    pub const REP_NOT_ROUTED: Self = Self::new(Category::Note, 304);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::STORE_VERSION_MISMATCH.to_string(), "W301");
        assert_eq!(DiagnosticCode::REP_NOT_ROUTED.to_string(), "N304");
        assert_eq!(DiagnosticCode::new(Category::Warning, 7).to_string(), "W007");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::FILTER_WARNING;
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
