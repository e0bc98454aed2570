// ABOUTME: Decides whether an outgoing request must be signed.
// ABOUTME: Signs when forced by configuration or when the host is ollama.com.

use url::Url;

/// Environment variable that forces signing for every destination.
pub const AUTH_ENV: &str = "OLLAMA_AUTH";

/// Hostname whose requests are always signed.
pub const SIGNING_HOST: &str = "ollama.com";

/// Whether `value` is exactly one of `1`, `true`, `yes`, `on`, ignoring case.
///
/// Surrounding whitespace is not stripped: `" 1 "` is falsy.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Signing decision, captured once from explicit inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SigningPolicy {
    force: bool,
}

impl SigningPolicy {
    /// `force` signs every request regardless of destination.
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Build from the raw flag value, as read from `OLLAMA_AUTH`.
    pub fn from_flag(flag: Option<&str>) -> Self {
        Self::new(flag.is_some_and(is_truthy))
    }

    /// Read `OLLAMA_AUTH` now and freeze the result.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(AUTH_ENV).ok().as_deref())
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Whether requests sent to `base_url` must be signed.
    ///
    /// An unparseable URL means "do not sign".
    pub fn should_sign(&self, base_url: &str) -> bool {
        if self.force {
            return true;
        }

        match Url::parse(base_url) {
            Ok(url) => url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(SIGNING_HOST)),
            Err(e) => {
                tracing::warn!(base_url, error = %e, "could not parse base URL, not signing");
                false
            }
        }
    }
}
