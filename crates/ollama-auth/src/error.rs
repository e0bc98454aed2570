// ABOUTME: Error types for key loading, wire framing, and request signing.
// ABOUTME: Each failure mode gets its own variant so callers can pick a remediation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding SSH wire blobs and authorization tokens.
#[derive(Error, Debug)]
pub enum WireError {
    /// Fewer than four bytes left for a length header.
    #[error("truncated SSH string at offset {offset}: need 4 header bytes, {remaining} remain")]
    Truncated { offset: usize, remaining: usize },

    /// A length header declares more bytes than the buffer holds.
    #[error("SSH string at offset {offset} declares {declared} bytes but only {remaining} remain")]
    LengthMismatch {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// Bytes left over after the last expected field.
    #[error("{0} trailing bytes after SSH blob")]
    TrailingData(usize),

    /// The blob carries a type name other than `ssh-ed25519`.
    #[error("signature algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch { expected: String, found: String },

    /// The payload is not the size the algorithm requires.
    #[error("{field} must be {expected} bytes, got {actual}")]
    PayloadLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A field is too long for the 4-byte length prefix.
    #[error("SSH string of {0} bytes does not fit a 4-byte length prefix")]
    TooLong(usize),

    /// Token lacks the `:` between the public key and signature halves.
    #[error("authorization token is missing the ':' separator")]
    MissingSeparator,

    /// One of the token halves is not valid base64.
    #[error("invalid base64 in authorization token: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors that can occur while loading keys and signing requests.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No key file exists at the resolved path.
    #[error("no signing key found at {path}; place an ed25519 OpenSSH private key there")]
    KeyNotFound { path: PathBuf },

    /// The key file exists but could not be read.
    #[error("failed to read signing key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a private key we can parse, or the passphrase is wrong.
    #[error("malformed private key at {path}: {reason}")]
    MalformedKey { path: PathBuf, reason: String },

    /// The key parsed fine but is not ed25519.
    #[error("unsupported key type: {0} (only ed25519 is supported)")]
    UnsupportedKeyType(String),

    /// A wire blob or token failed to decode.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Support for the key encoding was compiled out.
    #[error("{encoding} keys are not supported by this build; enable the `{feature}` feature of ollama-auth")]
    DependencyUnavailable {
        encoding: &'static str,
        feature: &'static str,
    },

    /// The signature does not verify against the challenge.
    #[error("signature verification failed: {0}")]
    InvalidSignature(#[source] ed25519_dalek::SignatureError),

    /// No key path was given and the home directory is unknown.
    #[error("could not determine home directory for the default key path")]
    NoHomeDirectory,
}

/// Result type alias using AuthError.
pub type Result<T> = std::result::Result<T, AuthError>;
