//! Configuration management for the hybrid router
//!
//! Supports configuration via:
//! 1. Config file (~/.config/hybrid-router/config.toml)
//! 2. Environment variables (ANTHROPIC_API_KEY, OLLAMA_URL, etc.)
//! 3. CLI arguments (override file/env settings)
//!
//! The router only reads configuration; it never writes it back.

use crate::routing::TaskCategory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local LLM (Ollama) configuration
    pub local: LocalSettings,

    /// Cloud LLM (Anthropic) configuration
    pub cloud: CloudSettings,

    /// Request defaults
    pub routing: RoutingSettings,
}

/// Local LLM (Ollama) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// Whether the local LLM is used at all
    pub enabled: bool,

    /// Ollama server URL
    pub url: String,

    /// Model to use
    pub model: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}

/// Cloud (Anthropic) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Whether the cloud provider may be used when a key is present
    pub enabled: bool,

    /// API key (can also use ANTHROPIC_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for Anthropic API
    pub base_url: String,

    /// Default model to use
    pub model: String,

    /// anthropic-version header value
    pub anthropic_version: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            anthropic_version: "2023-06-01".to_string(),
        }
    }
}

/// Defaults applied to routed requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Task category used when none is given
    pub default_task: TaskCategory,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
            default_task: TaskCategory::SimpleQuery,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hybrid-router")
            .join("config.toml")
    }

    /// Load config from specific path; a missing file yields defaults
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Local LLM
        if let Some(flag) = var("USE_LOCAL_LLM") {
            if let Some(enabled) = parse_flag(&flag) {
                self.local.enabled = enabled;
            }
        }
        if let Some(url) = var("OLLAMA_URL") {
            self.local.url = url;
        }
        if let Some(model) = var("OLLAMA_MODEL") {
            self.local.model = model;
        }

        // Anthropic
        if let Some(key) = var("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.cloud.api_key = Some(key);
        }
        if let Some(url) = var("ANTHROPIC_BASE_URL") {
            self.cloud.base_url = url;
        }
        if let Some(model) = var("ANTHROPIC_MODEL") {
            self.cloud.model = model;
        }

        self
    }

    /// Save config to specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Cloud API key, if one is configured and non-empty
    pub fn cloud_api_key(&self) -> Option<String> {
        self.cloud.api_key.clone().filter(|k| !k.is_empty())
    }

    /// Whether the cloud provider will be constructed
    pub fn has_cloud_key(&self) -> bool {
        self.cloud.enabled && self.cloud_api_key().is_some()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.local.enabled && !self.has_cloud_key() {
            return Err(ConfigError::MissingRequired(
                "At least one provider must be usable (enable the local LLM or set ANTHROPIC_API_KEY)"
                    .to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.routing.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "routing.temperature".to_string(),
                value: self.routing.temperature.to_string(),
            });
        }

        if self.routing.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "routing.max_tokens".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Set a single `section.field` value from a string
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "local.enabled" => self.local.enabled = parse_flag(value).ok_or_else(invalid)?,
            "local.url" => self.local.url = value.to_string(),
            "local.model" => self.local.model = value.to_string(),
            "cloud.enabled" => self.cloud.enabled = parse_flag(value).ok_or_else(invalid)?,
            "cloud.api_key" => self.cloud.api_key = Some(value.to_string()),
            "cloud.base_url" => self.cloud.base_url = value.to_string(),
            "cloud.model" => self.cloud.model = value.to_string(),
            "cloud.anthropic_version" => self.cloud.anthropic_version = value.to_string(),
            "routing.max_tokens" => self.routing.max_tokens = value.parse().map_err(|_| invalid())?,
            "routing.temperature" => {
                self.routing.temperature = value.parse().map_err(|_| invalid())?
            }
            "routing.default_task" => {
                self.routing.default_task = value.parse().map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        }

        Ok(())
    }

    /// Copy with the API key replaced by a mask, for display
    pub fn masked(&self) -> Self {
        let mut display = self.clone();
        if display.cloud.api_key.is_some() {
            display.cloud.api_key = Some("***".to_string());
        }
        display
    }

    /// Generate example config content
    pub fn example() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn local_enabled(mut self, enabled: bool) -> Self {
        self.config.local.enabled = enabled;
        self
    }

    pub fn local_url(mut self, url: impl Into<String>) -> Self {
        self.config.local.url = url.into();
        self
    }

    pub fn local_model(mut self, model: impl Into<String>) -> Self {
        self.config.local.model = model.into();
        self
    }

    pub fn cloud_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.cloud.api_key = Some(key.into());
        self
    }

    pub fn cloud_model(mut self, model: impl Into<String>) -> Self {
        self.config.cloud.model = model.into();
        self
    }

    pub fn cloud_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.cloud.base_url = url.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.routing.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
