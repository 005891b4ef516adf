//! Configuration Management
//!
//! Handles persistent configuration storage for the provider and resolves
//! the effective settings from provider configuration, the environment and
//! the config file.

use crate::voltage::client::DEFAULT_ENDPOINT;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "VOLTAGE_API_KEY";
/// Environment variable overriding the API endpoint
pub const ENV_ENDPOINT: &str = "VOLTAGE_ENDPOINT";

/// Persistent user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Voltage API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// API endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Settings the provider block itself may carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings used to build the API client
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("voltage").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Overwrite stored settings with the non-empty values of `update`
    pub fn merge(&mut self, update: &ProviderConfig) {
        if let Some(api_key) = non_empty(update.api_key.clone()) {
            self.api_key = Some(api_key);
        }
        if let Some(endpoint) = non_empty(update.endpoint.clone()) {
            self.endpoint = Some(endpoint);
        }
        if let Some(timeout_secs) = update.timeout_secs {
            self.timeout_secs = Some(timeout_secs);
        }
    }

    /// Resolve settings (provider block > environment > config file > defaults)
    pub fn resolve(&self, provider: &ProviderConfig) -> Result<Settings> {
        self.resolve_with(provider, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::resolve`] with an injectable environment lookup
    pub fn resolve_with<F>(&self, provider: &ProviderConfig, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(provider.api_key.clone())
            .or_else(|| non_empty(env(ENV_API_KEY)))
            .or_else(|| non_empty(self.api_key.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No Voltage API key configured. Set api_key in the provider block or {}",
                    ENV_API_KEY
                )
            })?;

        let endpoint = non_empty(provider.endpoint.clone())
            .or_else(|| non_empty(env(ENV_ENDPOINT)))
            .or_else(|| non_empty(self.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = provider
            .timeout_secs
            .or(self.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Settings {
            api_key,
            endpoint,
            timeout,
        })
    }
}
