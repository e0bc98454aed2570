// ABOUTME: Error types for ollama-client
// ABOUTME: Separates signing failures, transport failures, and HTTP status errors

use ollama_auth::AuthError;
use thiserror::Error;

/// Message shown when the server cannot be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Failed to connect to Ollama. Please check that Ollama is downloaded, running and accessible. https://ollama.com/download";

/// Errors that can occur in ollama-client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request had to be signed and signing failed.
    #[error("request signing failed: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    #[error("{}", CONNECTION_ERROR_MESSAGE)]
    Connection(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;
