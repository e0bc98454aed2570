// ABOUTME: Builds the byte string that gets signed for a request.
// ABOUTME: Injects the ts query parameter and renders "METHOD,/path?query".

use indexmap::IndexMap;
use std::time::{SystemTime, UNIX_EPOCH};
use url::form_urlencoded;

/// Query parameter carrying the signing timestamp.
pub const TIMESTAMP_PARAM: &str = "ts";

/// Get current Unix timestamp in seconds.
///
/// A clock set before the epoch yields 0 rather than failing the request;
/// the verifier rejects the stale timestamp on its own.
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// The signing input for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Bytes to sign: `"{method},{path}?{query}"`.
    pub bytes: Vec<u8>,
    /// The request path with `ts` injected, ready to send.
    pub path_with_ts: String,
    /// Timestamp placed in `ts`.
    pub timestamp: i64,
}

impl Challenge {
    pub fn as_str(&self) -> &str {
        // Built from `format!`, always UTF-8.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Build the challenge for `method` and a relative `path` at `timestamp`.
///
/// Existing query parameters keep their order, with repeated keys grouped
/// under their first occurrence. `ts` replaces any caller-supplied value in
/// place, otherwise it is appended last. Any `#fragment` stays on the
/// returned path and is never signed.
pub fn build_challenge(method: &str, path: &str, timestamp: i64) -> Challenge {
    let (without_fragment, fragment) = match path.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (path, None),
    };
    let (path_component, query) = match without_fragment.split_once('?') {
        Some((p, q)) => (p, q),
        None => (without_fragment, ""),
    };

    let ts = timestamp.to_string();
    let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params.insert(TIMESTAMP_PARAM.to_string(), vec![ts.clone()]);

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in &params {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    let new_query = serializer.finish();

    let challenge = if query.is_empty() {
        format!("{method},{path_component}?{TIMESTAMP_PARAM}={ts}")
    } else {
        format!("{method},{path_component}?{new_query}")
    };

    let mut path_with_ts = format!("{path_component}?{new_query}");
    if let Some(fragment) = fragment {
        path_with_ts.push('#');
        path_with_ts.push_str(fragment);
    }

    Challenge {
        bytes: challenge.into_bytes(),
        path_with_ts,
        timestamp,
    }
}
