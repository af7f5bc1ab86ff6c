//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base URL, image-host settings, cache stale time, where the session token
//! is kept and the last used email.
//!
//! Configuration is stored at `~/.config/schoolhub/config.json`. Environment
//! variables override the file so deployments can point the client at a
//! different backend without editing it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_STALE_MINUTES;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "schoolhub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

pub const ENV_API_URL: &str = "SCHOOLHUB_API_URL";
pub const ENV_CLOUD_NAME: &str = "SCHOOLHUB_CLOUDINARY_CLOUD_NAME";
pub const ENV_UPLOAD_PRESET: &str = "SCHOOLHUB_CLOUDINARY_UPLOAD_PRESET";

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
    pub stale_minutes: i64,
    pub token_backend: TokenBackend,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cloudinary_cloud_name: None,
            cloudinary_upload_preset: None,
            stale_minutes: DEFAULT_STALE_MINUTES,
            token_backend: TokenBackend::default(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(cloud) = get(ENV_CLOUD_NAME) {
            self.cloudinary_cloud_name = Some(cloud);
        }
        if let Some(preset) = get(ENV_UPLOAD_PRESET) {
            self.cloudinary_upload_preset = Some(preset);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Both image-host settings, when configured
    pub fn upload_settings(&self) -> Option<(&str, &str)> {
        match (&self.cloudinary_cloud_name, &self.cloudinary_upload_preset) {
            (Some(cloud), Some(preset)) => Some((cloud.as_str(), preset.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_backend, TokenBackend::File);
        assert!(config.upload_settings().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://api.school.test"),
            (ENV_CLOUD_NAME, "school-media"),
            (ENV_UPLOAD_PRESET, ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            cloudinary_upload_preset: Some("from-file".into()),
            ..Config::default()
        };
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_url, "https://api.school.test");
        assert_eq!(config.upload_settings(), Some(("school-media", "from-file")));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"token_backend":"keyring"}"#).unwrap();
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.stale_minutes, DEFAULT_STALE_MINUTES);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
