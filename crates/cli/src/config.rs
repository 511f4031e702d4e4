//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Endpoint used when neither a flag, env var nor config file sets one
pub const DEFAULT_API_ENDPOINT: &str = "https://api.orch.local";

/// Keys accepted by `config set`
pub const CONFIG_KEYS: &[&str] = &["api-endpoint", "project", "api-token", "format"];

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// API gateway URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Default project for project-scoped commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Pre-issued bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Default output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from the default file, overlaid with `ORCH_*`
    /// environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file (missing file is fine)
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix("ORCH"))
            .build()
            .context("Failed to read config file")?;

        settings
            .try_deserialize()
            .context("Failed to parse config file")
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Set one value by its `config set` key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.to_string()).filter(|v| !v.is_empty());
        match key {
            "api-endpoint" => {
                if let Some(endpoint) = &value {
                    url::Url::parse(endpoint).context("Invalid API URL")?;
                }
                self.api_endpoint = value;
            }
            "project" => self.project = value,
            "api-token" => self.api_token = value,
            "format" => self.format = value,
            other => anyhow::bail!(
                "unknown config key '{}', expected one of: {}",
                other,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("orch-cli").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.api_endpoint, None);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.set("api-endpoint", "https://api.edge.example").unwrap();
        config.set("format", "json").unwrap();
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("api_endpoint: https://api.edge.example"));
        assert!(!content.contains("api_token"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_endpoint.as_deref(), Some("https://api.edge.example"));
        assert_eq!(loaded.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = Config::default();
        let err = config.set("colour", "red").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }

    #[test]
    fn test_set_rejects_bad_endpoint() {
        let mut config = Config::default();
        assert!(config.set("api-endpoint", "not a url").is_err());
    }

    #[test]
    fn test_set_empty_value_clears() {
        let mut config = Config {
            api_token: Some("abc".to_string()),
            ..Default::default()
        };
        config.set("api-token", "").unwrap();
        assert_eq!(config.api_token, None);
    }
}
