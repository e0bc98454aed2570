// ABOUTME: Client configuration loaded from TOML with environment overrides
// ABOUTME: Host, timeout, extra headers, and the [auth] signing section

use crate::client::parse_host;
use anyhow::{Context, Result};
use ollama_auth::AuthConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the Ollama server.
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address; scheme optional (e.g., "ollama.com", "https://ollama.com")
    pub host: Option<String>,
    /// Request timeout in seconds (no timeout when unset)
    pub timeout_secs: Option<u64>,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Request signing settings
    pub auth: AuthConfig,
}

impl ClientConfig {
    /// Returns the config directory path (~/.config/ollama)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("ollama"))
    }

    /// Returns the path to the client config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("client.toml"))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the default config file, or defaults when it does not exist
    pub fn load_default() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no client config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Configuration from environment variables only
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply `OLLAMA_HOST`, `OLLAMA_AUTH` and `OLLAMA_KEY_PATH` on top of `self`
    pub fn merge_env(mut self) -> Self {
        if let Some(host) = std::env::var(HOST_ENV).ok().filter(|h| !h.trim().is_empty()) {
            self.host = Some(host);
        }
        self.auth = self.auth.merge_env();
        self
    }

    /// Normalized base URL for requests
    pub fn base_url(&self) -> String {
        parse_host(self.host.as_deref())
    }
}
