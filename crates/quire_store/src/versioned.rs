//! The versioned file-pair persistence primitive behind every store.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use quire_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::artifact::{decode_data, decode_version, encode_data, encode_version};
use crate::error::StoreError;

/// A value persisted as `<base>.version.db` plus `<base>.data.db`.
///
/// The on-disk state is either absent, valid for [`version`](Self::version),
/// or treated as absent. A mismatched version is skipped; unreadable files
/// are deleted and the load is retried exactly once.
#[derive(Debug, Clone)]
pub struct VersionedStore {
    name: String,
    version: u32,
    version_path: PathBuf,
    data_path: PathBuf,
}

enum Attempt<T> {
    Missing,
    Mismatch(u32),
    Loaded(T),
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

impl VersionedStore {
    /// Creates a store whose files sit next to `base`.
    pub fn new(base: impl AsRef<Path>, version: u32) -> Self {
        let base = base.as_ref();
        let name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            version,
            version_path: with_suffix(base, ".version.db"),
            data_path: with_suffix(base, ".data.db"),
        }
    }

    /// The store name, taken from the last component of the base path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version this store reads and writes.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Path of the version marker file.
    pub fn version_path(&self) -> &Path {
        &self.version_path
    }

    /// Path of the data file.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Reads the persisted value.
    ///
    /// Returns `Ok(None)` when nothing usable is stored: no version marker,
    /// a different version (reported as `W301`), or a corrupt store that was
    /// purged (reported as `W302`). Fails only if the purged store still
    /// cannot be read.
    pub fn load<T: DeserializeOwned>(
        &self,
        sink: &DiagnosticSink,
    ) -> Result<Option<T>, StoreError> {
        let first = match self.try_load() {
            Ok(attempt) => return Ok(self.finish(attempt, sink)),
            Err(e) => e,
        };

        warn!(store = %self.name, error = %first, "purging unreadable store");
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::STORE_PURGED,
                format!("store '{}' was unreadable and has been reset", self.name),
            )
            .with_subject(self.name.clone())
            .with_note(first.to_string()),
        );

        let retried = self.purge().and_then(|()| self.try_load());
        match retried {
            Ok(attempt) => Ok(self.finish(attempt, sink)),
            Err(e) => Err(StoreError::PersistentCorruption {
                store: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn finish<T>(&self, attempt: Attempt<T>, sink: &DiagnosticSink) -> Option<T> {
        match attempt {
            Attempt::Missing => {
                debug!(store = %self.name, "no stored data");
                None
            }
            Attempt::Mismatch(found) => {
                debug!(store = %self.name, found, expected = self.version, "store version mismatch");
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::STORE_VERSION_MISMATCH,
                        format!(
                            "store '{}' has version {found}, expected {}; ignoring it",
                            self.name, self.version
                        ),
                    )
                    .with_subject(self.name.clone()),
                );
                None
            }
            Attempt::Loaded(value) => {
                debug!(store = %self.name, "loaded store");
                Some(value)
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self) -> Result<Attempt<T>, StoreError> {
        let version_bytes = match std::fs::read(&self.version_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Attempt::Missing),
            Err(e) => return Err(StoreError::io(&self.version_path, e)),
        };
        let found = decode_version(&self.version_path, &version_bytes)?;
        if found != self.version {
            return Ok(Attempt::Mismatch(found));
        }

        let raw =
            std::fs::read(&self.data_path).map_err(|e| StoreError::io(&self.data_path, e))?;
        decode_data(&self.data_path, &raw).map(Attempt::Loaded)
    }

    /// Writes the version marker, then the data file, replacing both.
    pub fn store<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        if let Some(dir) = self.version_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let version = encode_version(&self.version_path, self.version)?;
        std::fs::write(&self.version_path, version)
            .map_err(|e| StoreError::io(&self.version_path, e))?;
        let data = encode_data(&self.data_path, value)?;
        std::fs::write(&self.data_path, data).map_err(|e| StoreError::io(&self.data_path, e))?;
        debug!(store = %self.name, version = self.version, "stored");
        Ok(())
    }

    /// Deletes both files. Missing files are not an error.
    pub fn purge(&self) -> Result<(), StoreError> {
        for path in [&self.version_path, &self.data_path] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(path, e)),
            }
        }
        Ok(())
    }
}
