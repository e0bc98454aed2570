// ABOUTME: Request signer that turns (method, path, headers) into a signed request.
// ABOUTME: Lowercases headers, injects ts, and sets the authorization token when policy says so.

use crate::cache::KeyCache;
use crate::challenge::{build_challenge, current_timestamp};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::key::{default_key_path, load_key, KeyMaterial};
use crate::policy::SigningPolicy;
use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Header carrying the signed token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Request headers with lowercase names, in insertion order.
pub type Headers = IndexMap<String, String>;

/// Lowercase header names, keeping values and order. Later duplicates win.
pub fn lowercase_headers<I, K, V>(headers: I) -> Headers
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    headers
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.as_ref().to_string()))
        .collect()
}

/// Whether `target` is a same-origin path rather than an absolute URL.
///
/// Only these are ever handed to [`RequestSigner::prepare`].
pub fn is_relative_path(target: &str) -> bool {
    target.starts_with('/')
}

/// Path and headers to send, after the signing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub path: String,
    pub headers: Headers,
    pub signed: bool,
}

/// Signs outgoing requests with the user's ed25519 key.
///
/// Holds no mutable state of its own; one signer can serve concurrent
/// requests.
#[derive(Clone, Default)]
pub struct RequestSigner {
    policy: SigningPolicy,
    key_path: Option<PathBuf>,
    passphrase: Option<String>,
    cache: Option<Arc<KeyCache>>,
}

impl RequestSigner {
    pub fn new(policy: SigningPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Build a signer from configuration. `cache_keys` attaches a fresh cache.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut signer = Self::new(SigningPolicy::new(config.force));
        if let Some(path) = &config.key_path {
            signer = signer.with_key_path(path.clone());
        }
        if config.cache_keys {
            signer = signer.with_cache(Arc::new(KeyCache::new()));
        }
        signer
    }

    /// Use `path` instead of `~/.ollama/id_ed25519`.
    pub fn with_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    /// Passphrase for an encrypted key.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Reuse loaded keys through `cache` instead of re-reading per request.
    pub fn with_cache(mut self, cache: Arc<KeyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn policy(&self) -> SigningPolicy {
        self.policy
    }

    /// The key file this signer reads.
    pub fn resolved_key_path(&self) -> Result<PathBuf> {
        match &self.key_path {
            Some(path) => Ok(path.clone()),
            None => default_key_path().ok_or(AuthError::NoHomeDirectory),
        }
    }

    /// Load the signing key, through the cache when one is attached.
    pub fn load_key(&self) -> Result<KeyMaterial> {
        let path = self.resolved_key_path()?;
        let passphrase = self.passphrase.as_deref().map(str::as_bytes);
        match &self.cache {
            Some(cache) => cache.get_or_load(&path, passphrase),
            None => load_key(&path, passphrase),
        }
    }

    /// Prepare a request to `base_url`, reading the clock for `ts`.
    ///
    /// # Errors
    /// Any key-loading error once the policy has decided to sign. A request
    /// that must be signed is never sent unsigned.
    pub fn prepare<I, K, V>(
        &self,
        base_url: &str,
        method: &str,
        path: &str,
        headers: I,
    ) -> Result<PreparedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.prepare_with(base_url, method, path, headers, current_timestamp)
    }

    /// Like [`RequestSigner::prepare`] with a caller-supplied timestamp.
    pub fn prepare_at<I, K, V>(
        &self,
        base_url: &str,
        method: &str,
        path: &str,
        headers: I,
        timestamp: i64,
    ) -> Result<PreparedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.prepare_with(base_url, method, path, headers, || timestamp)
    }

    fn prepare_with<I, K, V>(
        &self,
        base_url: &str,
        method: &str,
        path: &str,
        headers: I,
        now: impl FnOnce() -> i64,
    ) -> Result<PreparedRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = lowercase_headers(headers);

        if !self.policy.should_sign(base_url) {
            return Ok(PreparedRequest {
                path: path.to_string(),
                headers,
                signed: false,
            });
        }

        let challenge = build_challenge(method, path, now());
        let key = self.load_key()?;
        let token = key.token_for(&challenge.bytes).encode();
        tracing::debug!(
            method,
            path = %challenge.path_with_ts,
            fingerprint = %key.fingerprint(),
            "signed request"
        );

        headers.insert(AUTHORIZATION_HEADER.to_string(), token);
        Ok(PreparedRequest {
            path: challenge.path_with_ts,
            headers,
            signed: true,
        })
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("policy", &self.policy)
            .field("key_path", &self.key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
