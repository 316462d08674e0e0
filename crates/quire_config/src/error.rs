//! Errors raised while reading `quire.toml`.

use std::path::PathBuf;

/// Why a site configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The content is not valid TOML or does not fit [`SiteConfig`](crate::SiteConfig).
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A directory setting is empty.
    #[error("`{0}` must not be empty")]
    EmptyDir(&'static str),

    /// Output and stores would share one directory.
    #[error("output_dir and tmp_dir are both '{0}'")]
    SharedDir(String),
}
