//! Daemon Configuration
//!
//! Configuration management for the SMS bridge daemon.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sms_bridge_protocol::{SqliteSmsStore, DEFAULT_MAX_LINE_BYTES};
use std::fs;
use std::path::{Path, PathBuf};

/// Daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Content store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Host channel configuration
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database holding the `sms` table
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// API level reported to the decoder
    #[serde(default = "default_api_level")]
    pub api_level: u32,
}

/// Host channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Longest accepted call line in bytes
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_database_path() -> PathBuf {
    SqliteSmsStore::default_db_path()
        .unwrap_or_else(|_| PathBuf::from(".local/share/sms-bridge/sms.db"))
}

fn default_api_level() -> u32 {
    34
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_level: default_api_level(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl Config {
    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("sms-bridge")
            .join("daemon.toml")
    }

    /// Load configuration from `path`, writing defaults there on first run
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path, self.to_toml()?).context("Failed to write config file")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
