// ABOUTME: HTTP client for the Ollama API with request signing on relative paths
// ABOUTME: Relative targets go through RequestSigner; absolute URLs are sent untouched

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use ollama_auth::{is_relative_path, lowercase_headers, Headers, RequestSigner};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Server used when no host is configured.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

/// Normalize a host setting into a base URL.
///
/// Unset or blank hosts map to [`DEFAULT_HOST`]; hosts without a scheme get
/// `http://`.
pub fn parse_host(host: Option<&str>) -> String {
    let host = match host.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => return DEFAULT_HOST.to_string(),
    };
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

fn user_agent() -> String {
    format!(
        "ollama-rust/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Ollama API client.
///
/// Every request whose target starts with `/` is handed to the
/// [`RequestSigner`] before dispatch, so the signing decision and `ts`
/// injection happen per request. Absolute URLs skip signing entirely.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    headers: Headers,
    signer: RequestSigner,
}

impl Client {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        let mut client = Self::with_signer(
            http,
            config.base_url(),
            RequestSigner::from_config(&config.auth),
        );
        // Configured headers cannot replace content-type, accept or user-agent.
        let mut headers = lowercase_headers(&config.headers);
        headers.extend(std::mem::take(&mut client.headers));
        client.headers = headers;
        Ok(client)
    }

    /// Create a client around an existing HTTP client and signer.
    pub fn with_signer(
        http: reqwest::Client,
        base_url: impl Into<String>,
        signer: RequestSigner,
    ) -> Self {
        let headers = lowercase_headers([
            ("Content-Type", "application/json".to_string()),
            ("Accept", "application/json".to_string()),
            ("User-Agent", user_agent()),
        ]);
        Self {
            http,
            base_url: base_url.into(),
            headers,
            signer,
        }
    }

    /// Passphrase for an encrypted signing key.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.signer = self.signer.with_passphrase(passphrase);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Build a request for `target`, signing it when it is a relative path.
    ///
    /// Relative targets are normalized the way the URL will be sent before
    /// signing, so the signed path and the request line always match.
    /// Per-request `headers` override the client defaults.
    ///
    /// # Errors
    /// Signing failures are returned as `ClientError::Auth`; the request is
    /// never downgraded to unsigned.
    pub fn build_request(
        &self,
        method: Method,
        target: &str,
        headers: &Headers,
    ) -> Result<RequestBuilder> {
        let mut merged = self.headers.clone();
        merged.extend(lowercase_headers(headers));

        let (url, headers) = if is_relative_path(target) {
            let mut url = parse_url(&format!("{}{}", self.base_url.trim_end_matches('/'), target))?;
            // Sign the path as it is sent: percent-encoded, dot segments resolved.
            let sent_path = match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            };
            let prepared = self
                .signer
                .prepare(&self.base_url, method.as_str(), &sent_path, &merged)?;
            if prepared.signed {
                url.set_query(prepared.path.split_once('?').map(|(_, query)| query));
            }
            (url, prepared.headers)
        } else {
            (parse_url(target)?, merged)
        };

        Ok(self.http.request(method, url).headers(header_map(&headers)?))
    }

    /// Send a built request, mapping connection and status failures.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(e)
            } else {
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Build and send a request without a body.
    pub async fn request_raw(
        &self,
        method: Method,
        target: &str,
        headers: &Headers,
    ) -> Result<Response> {
        let request = self.build_request(method, target, headers)?;
        self.execute(request).await
    }

    pub async fn get(&self, target: &str) -> Result<Response> {
        self.request_raw(Method::GET, target, &Headers::new()).await
    }

    /// POST `body` as JSON.
    pub async fn post_json<T: Serialize + ?Sized>(&self, target: &str, body: &T) -> Result<Response> {
        let request = self
            .build_request(Method::POST, target, &Headers::new())?
            .json(body);
        self.execute(request).await
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| ClientError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

fn header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || ClientError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
