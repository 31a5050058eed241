//! Configuration management for sharebox
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/sharebox/
//! - macOS: ~/Library/Application Support/sharebox/
//! - Windows: %APPDATA%\sharebox\

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::ShareDuration;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Client behaviour
    #[serde(default)]
    pub client: ClientConfig,

    /// TUI-specific settings
    #[serde(default)]
    pub tui: TuiConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base origin of the API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin used when composing share links.
    /// Falls back to `base_url` when unset.
    pub share_base_url: Option<String>,
}

/// Client-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Confirm before bulk delete/revoke
    #[serde(default = "default_true")]
    pub confirm_delete: bool,

    /// Preselected expiry on the share screen
    #[serde(default)]
    pub default_share_duration: ShareDuration,

    /// Enable vim-style keybindings
    #[serde(default = "default_true")]
    pub vim_mode: bool,
}

/// TUI-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Enable mouse support
    #[serde(default)]
    pub mouse: bool,

    /// Log file location; defaults to the cache directory
    pub log_file: Option<PathBuf>,
}

// Default value functions
fn default_base_url() -> String {
    crate::DEFAULT_API_URL.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            share_base_url: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            confirm_delete: true,
            default_share_duration: ShareDuration::default(),
            vim_mode: true,
        }
    }
}

impl ApiConfig {
    pub fn share_base(&self) -> &str {
        self.share_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("sharebox"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
