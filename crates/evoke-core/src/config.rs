//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/evoke/config.toml)
//! 3. Environment variables (EVOKE_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! Strategies are configured per model name:
//!
//! ```toml
//! data_dir = "/var/lib/evoke"
//!
//! [strategies.car.find]
//! target = "local"
//! fallback = "remote"
//! synchronize = true
//! ```
//!
//! A configured strategy must name a rule for every action.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::strategy::{StoreKind, Strategy};

/// Environment variable prefix
const ENV_PREFIX: &str = "EVOKE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the store files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Treat the remote store as unreachable
    #[serde(default)]
    pub offline: bool,

    /// File to write logs to (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Routing strategy per model name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strategies: BTreeMap<String, Strategy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            offline: false,
            log_file: None,
            strategies: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (EVOKE_DATA_DIR, EVOKE_OFFLINE, EVOKE_LOG_FILE)
    /// 2. Config file (~/.config/evoke/config.toml or EVOKE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Read only what the file says, without environment overrides
    ///
    /// Use this before editing and saving a config file.
    /// If the file doesn't exist, defaults are used.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load from the path given on the command line, or the default location
    pub fn load_with_cli_override(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_OFFLINE", ENV_PREFIX)) {
            self.offline = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // Empty string clears it
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with EVOKE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("evoke")
            .join("config.toml")
    }

    /// Strategy configured for a model, or the default one
    pub fn strategy_for(&self, model: &str) -> Strategy {
        self.strategies.get(model).cloned().unwrap_or_default()
    }

    /// Path of a model's store file for one side
    pub fn store_path(&self, model: &str, kind: StoreKind) -> PathBuf {
        self.data_dir
            .join(kind.as_str())
            .join(format!("{}.json", model))
    }

    pub fn local_store_path(&self, model: &str) -> PathBuf {
        self.store_path(model, StoreKind::Local)
    }

    pub fn remote_store_path(&self, model: &str) -> PathBuf {
        self.store_path(model, StoreKind::Remote)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evoke")
}
