//! Application configuration management.
//!
//! Holds the API base URL, the last used email, the credential backend and
//! an optional request timeout.
//!
//! Configuration is stored at `~/.config/taskdeck/config.json`. The API URL
//! can be overridden with the `TASKDECK_API_URL` environment variable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::store::{CredentialStore, FileStore, KeyValueStore, KeyringStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "taskdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "TASKDECK_API_URL";

/// Used when neither the environment nor the config file names a server
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub credential_backend: CredentialBackend,
    /// No timeout is applied when unset
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
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

    /// Resolve the API URL: environment, then config file, then default
    pub fn api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        let url = self.api_url();
        let client = match self.request_timeout() {
            Some(timeout) => ApiClient::with_timeout(&url, timeout),
            None => ApiClient::new(&url),
        };
        client.context("Failed to build HTTP client")
    }

    /// Open the configured credential backend
    pub fn credential_store(&self) -> Result<CredentialStore> {
        let backend: Arc<dyn KeyValueStore> = match self.credential_backend {
            CredentialBackend::File => Arc::new(FileStore::new(self.cache_dir()?)),
            CredentialBackend::Keyring => Arc::new(KeyringStore::new()),
        };
        Ok(CredentialStore::from_arc(backend))
    }
}
