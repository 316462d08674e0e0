//! Configuration types deserialized from `quire.toml`.

use quire_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The top-level site configuration parsed from `quire.toml`.
///
/// `params` holds arbitrary site-wide values. They are handed to rules and
/// filters untouched, and any change to them invalidates every representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory layout settings.
    #[serde(default)]
    pub site: SiteSection,
    /// Arbitrary site-wide key/value configuration.
    #[serde(default)]
    pub params: toml::Table,
    /// The site root directory. Relative paths in `site` are resolved against it.
    #[serde(skip)]
    pub dir: PathBuf,
}

/// The `[site]` table: where compiled output and incremental state live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSection {
    /// Directory compiled representations are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Directory holding the incremental compilation stores.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_tmp_dir() -> String {
    "tmp".to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tmp_dir: default_tmp_dir(),
        }
    }
}

impl SiteConfig {
    /// Creates a configuration with default settings rooted at `dir`.
    pub fn with_defaults(dir: impl Into<PathBuf>) -> Self {
        Self {
            site: SiteSection::default(),
            params: toml::Table::new(),
            dir: dir.into(),
        }
    }

    /// Returns the absolute-or-site-relative output root.
    pub fn output_root(&self) -> PathBuf {
        resolve(&self.dir, &self.site.output_dir)
    }

    /// Returns the directory incremental stores are kept under.
    pub fn tmp_root(&self) -> PathBuf {
        resolve(&self.dir, &self.site.tmp_dir)
    }

    /// Looks up a site-wide parameter.
    pub fn param(&self, key: &str) -> Option<&toml::Value> {
        self.params.get(key)
    }

    /// Digest of the settings that influence compiled output.
    ///
    /// The site root directory is excluded, so moving a site does not
    /// invalidate its caches.
    pub fn checksum(&self) -> ContentHash {
        // toml::Table is ordered by key, so the JSON form is canonical.
        let site = serde_json::to_vec(&self.site).unwrap_or_default();
        let params = serde_json::to_vec(&self.params).unwrap_or_default();
        ContentHash::from_parts([site.as_slice(), params.as_slice()])
    }
}

fn resolve(dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        dir.join(p)
    }
}
