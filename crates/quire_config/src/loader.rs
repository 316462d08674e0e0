//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SiteConfig;
use std::path::Path;

/// Name of the configuration file at the site root.
pub const CONFIG_FILE: &str = "quire.toml";

/// Loads and validates `quire.toml` from a site directory.
///
/// The returned configuration has its `dir` set to `site_dir`.
pub fn load_config(site_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let path = site_dir.join(CONFIG_FILE);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    let mut config = load_config_from_str(&content)?;
    config.dir = site_dir.to_path_buf();
    Ok(config)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let site = &config.site;
    if site.output_dir.trim().is_empty() {
        return Err(ConfigError::EmptyDir("site.output_dir"));
    }
    if site.tmp_dir.trim().is_empty() {
        return Err(ConfigError::EmptyDir("site.tmp_dir"));
    }
    if site.output_dir == site.tmp_dir {
        return Err(ConfigError::SharedDir(site.output_dir.clone()));
    }
    Ok(())
}
