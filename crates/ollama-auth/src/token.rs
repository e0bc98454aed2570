// ABOUTME: Authorization token built from SSH-framed public key and signature blobs.
// ABOUTME: Formats as base64(pubkey_blob):base64(sig_blob) and parses/verifies it back.

use crate::error::{AuthError, Result, WireError};
use crate::wire::{self, PUBLIC_KEY_LEN, SIGNATURE_LEN};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// A signed request token: raw ed25519 public key and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub signature: [u8; SIGNATURE_LEN],
}

impl Token {
    /// SSH public key blob: `string("ssh-ed25519") + string(pubkey)`.
    pub fn public_key_blob(&self) -> Vec<u8> {
        wire::ed25519_blob(&self.public_key)
    }

    /// SSH signature blob: `string("ssh-ed25519") + string(signature)`.
    pub fn signature_blob(&self) -> Vec<u8> {
        wire::ed25519_blob(&self.signature)
    }

    /// Render the `authorization` header value.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}",
            STANDARD.encode(self.public_key_blob()),
            STANDARD.encode(self.signature_blob())
        )
    }

    /// Parse an `authorization` header value back into its raw parts.
    ///
    /// # Errors
    /// Returns a `WireError` for a missing separator, bad base64, or any
    /// framing problem in either blob.
    pub fn parse(token: &str) -> std::result::Result<Self, WireError> {
        let (pub_b64, sig_b64) = token.split_once(':').ok_or(WireError::MissingSeparator)?;

        let pub_blob = STANDARD.decode(pub_b64)?;
        let sig_blob = STANDARD.decode(sig_b64)?;

        let public_key = wire::expect_typed_blob(&pub_blob, "public key", PUBLIC_KEY_LEN)?;
        let signature = wire::expect_typed_blob(&sig_blob, "signature", SIGNATURE_LEN)?;

        let mut token = Token {
            public_key: [0u8; PUBLIC_KEY_LEN],
            signature: [0u8; SIGNATURE_LEN],
        };
        token.public_key.copy_from_slice(public_key);
        token.signature.copy_from_slice(signature);
        Ok(token)
    }

    /// Check the signature over `challenge` with the embedded public key.
    ///
    /// This is the contract the remote verifier applies; it lives here so
    /// callers and tests can confirm a token before sending it.
    pub fn verify(&self, challenge: &[u8]) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.public_key).map_err(AuthError::InvalidSignature)?;
        let signature = Signature::from_bytes(&self.signature);
        verifying_key
            .verify(challenge, &signature)
            .map_err(AuthError::InvalidSignature)
    }
}
