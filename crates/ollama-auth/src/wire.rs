// ABOUTME: SSH wire-format string framing for key and signature blobs.
// ABOUTME: Encodes/decodes 4-byte big-endian length-prefixed byte strings.

use crate::error::WireError;

/// The only key and signature type name this crate speaks.
pub const ALGORITHM: &str = "ssh-ed25519";

/// Raw ed25519 public key length.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Raw ed25519 signature length.
pub const SIGNATURE_LEN: usize = 64;

const LENGTH_PREFIX: usize = 4;

/// Encode bytes as an SSH string (4-byte big-endian length + data).
///
/// # Errors
/// `WireError::TooLong` if `bytes` is longer than `u32::MAX`, the most the
/// length prefix can describe.
pub fn encode_string(bytes: &[u8]) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(LENGTH_PREFIX + bytes.len());
    push_string(&mut out, bytes)?;
    Ok(out)
}

fn length_prefix(len: usize) -> Result<[u8; LENGTH_PREFIX], WireError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| WireError::TooLong(len))
}

fn push_string(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), WireError> {
    out.extend_from_slice(&length_prefix(bytes.len())?);
    out.extend_from_slice(bytes);
    Ok(())
}

/// Decode the SSH string starting at `offset`.
///
/// Returns the string contents and the offset just past them.
///
/// # Errors
/// `WireError::Truncated` if the length header does not fit,
/// `WireError::LengthMismatch` if the declared length overruns the buffer.
pub fn decode_string(buf: &[u8], offset: usize) -> Result<(&[u8], usize), WireError> {
    let remaining = buf.len().saturating_sub(offset);
    if remaining < LENGTH_PREFIX {
        return Err(WireError::Truncated { offset, remaining });
    }

    let mut header = [0u8; LENGTH_PREFIX];
    header.copy_from_slice(&buf[offset..offset + LENGTH_PREFIX]);
    let declared = u32::from_be_bytes(header) as usize;

    let start = offset + LENGTH_PREFIX;
    let available = remaining - LENGTH_PREFIX;
    if declared > available {
        return Err(WireError::LengthMismatch {
            offset,
            declared,
            remaining: available,
        });
    }

    let end = start + declared;
    Ok((&buf[start..end], end))
}

/// Build a two-field blob: SSH string of the type name, then of the payload.
///
/// # Errors
/// `WireError::TooLong` if either field exceeds `u32::MAX` bytes.
pub fn build_typed_blob(type_name: &[u8], payload: &[u8]) -> Result<Vec<u8>, WireError> {
    let mut blob = Vec::with_capacity(2 * LENGTH_PREFIX + type_name.len() + payload.len());
    push_string(&mut blob, type_name)?;
    push_string(&mut blob, payload)?;
    Ok(blob)
}

/// `ssh-ed25519` blob around fixed-size key material.
pub(crate) fn ed25519_blob<const N: usize>(payload: &[u8; N]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(2 * LENGTH_PREFIX + ALGORITHM.len() + N);
    for field in [ALGORITHM.as_bytes(), payload.as_slice()] {
        // Fields here are at most SIGNATURE_LEN bytes.
        blob.extend_from_slice(&(field.len() as u32).to_be_bytes());
        blob.extend_from_slice(field);
    }
    blob
}

/// Split a two-field blob back into `(type_name, payload)`.
///
/// # Errors
/// Any framing error from [`decode_string`], or `WireError::TrailingData`
/// if bytes remain after the payload.
pub fn parse_typed_blob(blob: &[u8]) -> Result<(&[u8], &[u8]), WireError> {
    let (type_name, next) = decode_string(blob, 0)?;
    let (payload, end) = decode_string(blob, next)?;
    if end != blob.len() {
        return Err(WireError::TrailingData(blob.len() - end));
    }
    Ok((type_name, payload))
}

/// Parse a typed blob that must carry `ssh-ed25519` and a payload of `expected_len` bytes.
pub(crate) fn expect_typed_blob<'a>(
    blob: &'a [u8],
    field: &'static str,
    expected_len: usize,
) -> Result<&'a [u8], WireError> {
    let (type_name, payload) = parse_typed_blob(blob)?;
    if type_name != ALGORITHM.as_bytes() {
        return Err(WireError::AlgorithmMismatch {
            expected: ALGORITHM.to_string(),
            found: String::from_utf8_lossy(type_name).into_owned(),
        });
    }
    if payload.len() != expected_len {
        return Err(WireError::PayloadLength {
            field,
            expected: expected_len,
            actual: payload.len(),
        });
    }
    Ok(payload)
}
