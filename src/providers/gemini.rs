//! Gemini generateMessage
//!
//! Inbound headers are forwarded after stripping `host`, `content-length` and
//! the gateway's placeholder `authorization`, which is replaced by the real
//! secret.

use super::OutboundRequest;
use crate::api::ChatRequest;
use crate::client::headers;
use crate::error::Result;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde_json::{json, Value};

pub(crate) fn build(
    base_url: &str,
    secret: &str,
    model: &str,
    request: &ChatRequest,
    inbound: &HeaderMap,
) -> Result<OutboundRequest> {
    let mut headers = headers::forwardable(inbound);
    headers.insert(AUTHORIZATION, headers::bearer(secret)?);

    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role,
                "parts": [{"text": m.content.to_string_content()}]
            })
        })
        .collect();

    Ok(OutboundRequest {
        url: format!(
            "{}/models/{}:generateMessage",
            base_url.trim_end_matches('/'),
            urlencoding::encode(model)
        ),
        headers,
        payload: json!({ "contents": contents }),
    })
}
