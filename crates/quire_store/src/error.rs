//! Error types for store operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a store.
///
/// Loading is fail-safe: a corrupt store is purged and reloaded as empty, and
/// only [`StoreError::PersistentCorruption`] ever reaches the compiler.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing store files.
    #[error("store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A data file has an invalid or missing header.
    #[error("invalid store header in {path}: {reason}")]
    InvalidHeader {
        /// The data file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The data file path.
        path: PathBuf,
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error in {path}: {reason}")]
    Serialization {
        /// The file being encoded or decoded.
        path: PathBuf,
        /// Description of the serialization failure.
        reason: String,
    },

    /// The store could still not be read after purging it once.
    #[error("store '{store}' is unreadable even after being purged: {reason}")]
    PersistentCorruption {
        /// The store name.
        store: String,
        /// The error of the second attempt.
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
