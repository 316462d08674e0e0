//! Parsing and validation of `quire.toml` site configuration files.
//!
//! This crate reads the site configuration into a strongly-typed
//! [`SiteConfig`] and derives the on-disk locations of the incremental
//! compilation stores from it.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod paths;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use paths::{store_path, tmp_path_prefix};
pub use types::*;
