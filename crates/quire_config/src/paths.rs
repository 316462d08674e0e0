//! Locations of the incremental compilation stores.
//!
//! Stores live under `<tmp_dir>/quire/<digest>/`, where the digest is taken
//! from the configured output directory. Two configurations of the same site
//! writing to different output directories therefore never share caches.

use crate::types::SiteConfig;
use quire_common::ContentHash;
use std::path::{Path, PathBuf};

/// Number of hex digits of the output-directory digest used in store paths.
const PREFIX_DIGITS: usize = 12;

/// Returns the store directory, relative to the tmp root, for an output directory.
pub fn tmp_path_prefix(output_dir: &str) -> PathBuf {
    let digest = ContentHash::from_bytes(output_dir.as_bytes()).hex_prefix(PREFIX_DIGITS);
    Path::new("quire").join(digest)
}

/// Returns the base path of the store named `store_name`.
///
/// The versioned store appends `.version.db` and `.data.db` to this path.
pub fn store_path(config: &SiteConfig, store_name: &str) -> PathBuf {
    config
        .tmp_root()
        .join(tmp_path_prefix(&config.site.output_dir))
        .join(store_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_deterministic() {
        assert_eq!(tmp_path_prefix("output"), tmp_path_prefix("output"));
    }

    #[test]
    fn prefix_depends_on_output_dir() {
        assert_ne!(tmp_path_prefix("output"), tmp_path_prefix("public"));
    }

    #[test]
    fn store_path_layout() {
        let config = SiteConfig::with_defaults("/srv/site");
        let path = store_path(&config, "checksums");
        assert!(path.starts_with("/srv/site/tmp/quire"));
        assert!(path.ends_with("checksums"));
        let digest = path.parent().unwrap().file_name().unwrap().to_str().unwrap();
        assert_eq!(digest.len(), PREFIX_DIGITS);
    }
}
