//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/safezone/config.toml

pub mod defaults;

use crate::api::RequestContext;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Geocoding settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Map interaction settings
    #[serde(default)]
    pub map: MapConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all REST paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token (overridden by SAFEZONE_TOKEN)
    #[serde(default)]
    pub token: String,

    /// Request timeout in seconds, 0 for the transport default
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Results requested from forward geocoding
    #[serde(default = "default_forward_limit")]
    pub forward_limit: usize,
}

/// Map interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Delay before a hover triggers a lookup
    #[serde(default = "default_hover_delay_ms")]
    pub hover_delay_ms: u64,

    /// Default output format for zone listings
    #[serde(default = "default_format")]
    pub default_format: String,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_forward_limit() -> usize {
    DEFAULT_FORWARD_LIMIT
}
fn default_hover_delay_ms() -> u64 {
    DEFAULT_HOVER_DELAY_MS
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            forward_limit: default_forward_limit(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: default_hover_delay_ms(),
            default_format: default_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "base_url"] => Some(self.api.base_url.clone()),
            ["api", "token"] => Some(self.api.token.clone()),
            ["api", "timeout_secs"] => Some(self.api.timeout_secs.to_string()),

            ["geocode", "forward_limit"] => Some(self.geocode.forward_limit.to_string()),

            ["map", "hover_delay_ms"] => Some(self.map.hover_delay_ms.to_string()),
            ["map", "default_format"] => Some(self.map.default_format.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "base_url"] => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(Error::Config(format!("Invalid base URL: {}", value)));
                }
                self.api.base_url = value.to_string();
            }
            ["api", "token"] => {
                self.api.token = value.to_string();
            }
            ["api", "timeout_secs"] => {
                self.api.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["geocode", "forward_limit"] => {
                let limit: usize = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid limit value: {}", value))
                })?;
                if limit == 0 {
                    return Err(Error::Config("Forward limit must be at least 1".to_string()));
                }
                self.geocode.forward_limit = limit;
            }

            ["map", "hover_delay_ms"] => {
                self.map.hover_delay_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid delay value: {}", value))
                })?;
            }
            ["map", "default_format"] => {
                self.map.default_format = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "api.base_url",
            "api.token",
            "api.timeout_secs",
            "geocode.forward_limit",
            "map.hover_delay_ms",
            "map.default_format",
        ]
    }

    /// Token to send: the environment override if set, else the configured one
    pub fn resolve_token(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.api.token.clone()).filter(|t| !t.is_empty()))
    }

    /// Build the request context for API calls
    pub fn request_context(&self) -> RequestContext {
        let mut context = RequestContext::new(self.api.base_url.clone());
        if let Some(token) = self.resolve_token(std::env::var(TOKEN_ENV_VAR).ok()) {
            context = context.with_token(token);
        }
        if self.api.timeout_secs > 0 {
            context = context.with_timeout(Duration::from_secs(self.api.timeout_secs));
        }
        context
    }

    /// Hover delay as a duration
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.map.hover_delay_ms)
    }
}
