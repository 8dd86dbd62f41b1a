//! Outbound Header Construction
//!
//! Builds authentication headers for upstream calls and sanitizes inbound
//! headers when a provider forwards them.

use crate::error::{GatewayError, Result};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, AUTHORIZATION, CONNECTION,
    CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING,
};
use std::collections::HashMap;

/// Inbound headers never copied to an upstream request.
///
/// `host` and `content-length` describe the inbound hop and would corrupt the
/// outbound call; `authorization` carries the gateway placeholder and is
/// replaced with the real secret.
static STRIPPED_HEADERS: [HeaderName; 6] = [
    HOST,
    CONTENT_LENGTH,
    AUTHORIZATION,
    CONNECTION,
    TRANSFER_ENCODING,
    ACCEPT_ENCODING,
];

/// `Authorization: Bearer <secret>`
pub fn bearer(secret: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", secret))
        .map_err(|e| {
            GatewayError::Config(format!("Pooled API key is not a valid header value: {}", e))
        })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Fresh header map with a JSON content type
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Copy inbound headers minus hop-specific ones and the placeholder auth
pub fn forwardable(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in STRIPPED_HEADERS.iter() {
        headers.remove(name);
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Add configured static headers; invalid names or values are skipped
pub fn apply_extra(headers: &mut HeaderMap, extra: &HashMap<String, String>) {
    for (key, value) in extra {
        if let (Ok(name), Ok(val)) = (
            HeaderName::try_from(key.as_str()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, val);
        }
    }
}
