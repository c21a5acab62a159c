//! # Configuration
//!
//! Configuration is loaded with [`confique`] from TOML files and environment
//! variables.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `SUPERHXPRO_HASH_CHUNK_SIZE`, `SUPERHXPRO_FOLLOW_LINKS`.
//! 2. **Explicit file**: the `--config <FILE>` argument, which must exist.
//! 3. **Global file**: `superhxpro.toml` in the OS config directory (via `directories`).
//! 4. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `hash_chunk_size` | `65536` | Bytes read per chunk when hashing for deduplication |
//! | `follow_links` | `false` | Follow symbolic links while walking trees |

use crate::commands::dedupe::DEFAULT_CHUNK_SIZE;
use crate::error::{HelperError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "superhxpro.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HelperConfig {
    /// Bytes read per chunk when hashing files for deduplication.
    #[config(env = "SUPERHXPRO_HASH_CHUNK_SIZE", default = 65536)]
    pub hash_chunk_size: usize,

    /// Follow symbolic links while walking directory trees.
    #[config(env = "SUPERHXPRO_FOLLOW_LINKS", default = false)]
    pub follow_links: bool,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            hash_chunk_size: DEFAULT_CHUNK_SIZE,
            follow_links: false,
        }
    }
}

impl HelperConfig {
    /// Resolve the configuration, optionally layering an explicit file over
    /// the global one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(HelperError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            builder = builder.file(path);
        }
        if let Some(global) = global_config_path() {
            debug!("Global config: {}", global.display());
            builder = builder.file(global);
        }

        let config = builder
            .load()
            .map_err(|e| HelperError::Config(e.to_string()))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if self.hash_chunk_size == 0 {
            return Err(HelperError::Config(
                "hash_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

/// `superhxpro.toml` in the platform config directory, if one can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "superhxpro").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = HelperConfig::default();
        assert_eq!(config.hash_chunk_size, 65536);
        assert!(!config.follow_links);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "hash_chunk_size = 4096\nfollow_links = true\n").unwrap();

        let config = HelperConfig::load(Some(&path)).unwrap();
        assert_eq!(config.hash_chunk_size, 4096);
        assert!(config.follow_links);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = HelperConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(HelperError::Config(_))));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = HelperConfig {
            hash_chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HelperError::Config(_))));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "hash_chunk_size = \"lots\"").unwrap();

        assert!(matches!(
            HelperConfig::load(Some(&path)),
            Err(HelperError::Config(_))
        ));
    }
}
