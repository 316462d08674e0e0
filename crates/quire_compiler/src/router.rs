//! Output path bookkeeping for a run.

use std::collections::BTreeMap;

use quire_model::RepKey;

use crate::error::CompileError;

/// Output paths claimed so far and the snapshot that claimed each.
///
/// Every output path belongs to exactly one snapshot of one rep.
#[derive(Debug, Default)]
pub struct RouteTable {
    claimed: BTreeMap<String, String>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `path` for a snapshot of a rep.
    pub fn claim(&mut self, path: &str, rep: &RepKey, snapshot: &str) -> Result<(), CompileError> {
        let owner = format!("{rep} snapshot '{snapshot}'");
        match self.claimed.get(path) {
            Some(first) => Err(CompileError::DuplicateRoute {
                path: path.to_string(),
                first: first.clone(),
                second: owner,
            }),
            None => {
                self.claimed.insert(path.to_string(), owner);
                Ok(())
            }
        }
    }

    /// Number of claimed paths.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns `true` if no path is claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
