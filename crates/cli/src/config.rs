//! Configuration management for the CLI
//!
//! Defaults come from `~/.config/cca/config.json` (optional) overlaid with
//! `CCA_*` environment variables. Explicit command-line flags win over both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Show every workload instead of the top N
    pub show_all: Option<bool>,
    /// Rows in the ranked table
    pub top: Option<usize>,
    /// Lookback for conservative mode
    pub conservative_days: Option<u32>,
    /// Bucket width, e.g. `7d`
    pub bucket_size: Option<String>,
    /// Default output format (`table` or `json`)
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from the default file and environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path(),
        };
        Self::load_from(path.as_deref(), override_path.is_some())
    }

    fn load_from(path: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(required));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("CCA").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        tracing::debug!(path = ?path, config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("cca").join("config.json"))
    }
}
