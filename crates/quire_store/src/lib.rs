//! Persistent state carried between compilation runs.
//!
//! Every store is a [`VersionedStore`] file pair under the site's tmp
//! directory. Stores are loaded at the start of a run and written back only
//! after the whole run succeeded, so a failed run never leaves half-applied
//! state behind.

#![warn(missing_docs)]

pub mod artifact;
pub mod checksums;
pub mod compiled;
pub mod dependencies;
pub mod error;
pub mod rule_memory;
pub mod versioned;

pub use checksums::{ChecksumKey, ChecksumStore};
pub use compiled::{CompiledContentCache, Snapshots};
pub use dependencies::{Dependency, DependencyStore};
pub use error::StoreError;
pub use rule_memory::RuleMemoryStore;
pub use versioned::VersionedStore;
