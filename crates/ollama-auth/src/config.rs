// ABOUTME: Signing configuration: force flag, key location, and key caching.
// ABOUTME: Deserializes from the [auth] table of a TOML file or reads the environment once.

use crate::policy::{is_truthy, AUTH_ENV};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the key file location.
pub const KEY_PATH_ENV: &str = "OLLAMA_KEY_PATH";

/// Signing settings captured by the embedder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Sign every request, not just those to ollama.com.
    pub force: bool,
    /// Private key file (defaults to ~/.ollama/id_ed25519)
    pub key_path: Option<PathBuf>,
    /// Keep loaded keys in memory across requests
    pub cache_keys: bool,
}

impl AuthConfig {
    /// Read `OLLAMA_AUTH` and `OLLAMA_KEY_PATH` from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(AUTH_ENV).ok().as_deref(),
            std::env::var_os(KEY_PATH_ENV).map(PathBuf::from),
        )
    }

    fn from_vars(auth: Option<&str>, key_path: Option<PathBuf>) -> Self {
        Self {
            force: auth.is_some_and(is_truthy),
            key_path: key_path.filter(|p| !p.as_os_str().is_empty()),
            cache_keys: false,
        }
    }

    /// Apply environment values on top of `self`; set variables win.
    pub fn merge_env(mut self) -> Self {
        let env = Self::from_env();
        self.force |= env.force;
        if env.key_path.is_some() {
            self.key_path = env.key_path;
        }
        self
    }
}
