// ABOUTME: Ollama API client with request signing
// ABOUTME: Wires ollama-auth into reqwest so relative-path requests are signed before dispatch

pub mod client;
pub mod config;
pub mod error;

pub use client::{parse_host, Client, DEFAULT_HOST};
pub use config::{ClientConfig, HOST_ENV};
pub use error::{ClientError, Result, CONNECTION_ERROR_MESSAGE};

// Re-export the signing types callers need to configure a client.
pub use ollama_auth::{AuthConfig, Headers, KeyCache, RequestSigner, SigningPolicy};
