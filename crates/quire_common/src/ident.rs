//! Path-like identifiers for items and layouts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stable identifier of a document, such as `/blog/hello.md`.
///
/// Identifiers always start with `/` and are compared as plain strings. They
/// are persisted between runs, so unlike arena ids they stay valid when the
/// document set changes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

/// Error returned when a string is not a valid document identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier '{0}': identifiers must start with '/'")]
pub struct InvalidIdentifier(pub String);

impl Identifier {
    /// Creates an identifier, rejecting strings that do not start with `/`.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let s = s.into();
        if s.starts_with('/') {
            Ok(Self(s))
        } else {
            Err(InvalidIdentifier(s))
        }
    }

    /// The root identifier `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the extension of the last path component, if any.
    pub fn extension(&self) -> Option<&str> {
        let last = self.0.rsplit('/').next()?;
        let dot = last.rfind('.')?;
        if dot == 0 {
            return None;
        }
        Some(&last[dot + 1..])
    }

    /// Returns the identifier with the extension of its last component removed.
    pub fn without_extension(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.0[..self.0.len() - ext.len() - 1],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}
