// ABOUTME: Request signing for the Ollama API client.
// ABOUTME: Policy, challenge construction, SSH wire framing, key loading, and the request signer.

//! # ollama-auth
//!
//! Signs outgoing Ollama API requests with the caller's ed25519 key.
//!
//! A request is signed when `OLLAMA_AUTH` is truthy or the destination host
//! is `ollama.com`. Signing appends a `ts=<unix seconds>` query parameter,
//! signs `"{METHOD},{path}?{query}"`, and sets the `authorization` header to
//! `base64(pubkey_blob):base64(sig_blob)`, where both blobs use SSH wire
//! framing with the `ssh-ed25519` type name.
//!
//! ## Example
//!
//! ```no_run
//! use ollama_auth::{RequestSigner, SigningPolicy};
//!
//! let signer = RequestSigner::new(SigningPolicy::from_env());
//! let prepared = signer
//!     .prepare(
//!         "https://ollama.com",
//!         "GET",
//!         "/api/tags",
//!         [("Accept", "application/json")],
//!     )
//!     .expect("should sign");
//!
//! assert!(prepared.path.starts_with("/api/tags?ts="));
//! assert!(prepared.headers.contains_key("authorization"));
//! ```

mod cache;
mod challenge;
mod config;
mod error;
mod key;
mod policy;
mod signer;
mod token;
pub mod wire;

pub use cache::KeyCache;
pub use challenge::{build_challenge, current_timestamp, Challenge, TIMESTAMP_PARAM};
pub use config::{AuthConfig, KEY_PATH_ENV};
pub use error::{AuthError, Result, WireError};
pub use key::{default_key_path, load_key, KeyMaterial};
pub use policy::{is_truthy, SigningPolicy, AUTH_ENV, SIGNING_HOST};
pub use signer::{
    is_relative_path, lowercase_headers, Headers, PreparedRequest, RequestSigner,
    AUTHORIZATION_HEADER,
};
pub use token::Token;
