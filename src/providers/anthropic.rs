//! Anthropic Messages API

use super::OutboundRequest;
use crate::api::ChatRequest;
use crate::client::headers;
use crate::error::{GatewayError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{json, Map, Value};

/// Sent when neither the client nor the provider config sets max_tokens
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

pub const API_VERSION: &str = "2023-06-01";

pub(crate) fn build(
    base_url: &str,
    secret: &str,
    model: &str,
    request: &ChatRequest,
    default_max_tokens: Option<u32>,
) -> Result<OutboundRequest> {
    let mut headers = headers::json_headers();
    let mut api_key = HeaderValue::from_str(secret).map_err(|e| {
        GatewayError::Config(format!("Pooled API key is not a valid header value: {}", e))
    })?;
    api_key.set_sensitive(true);
    headers.insert(HeaderName::from_static("x-api-key"), api_key);
    headers.insert(
        HeaderName::from_static("anthropic-version"),
        HeaderValue::from_static(API_VERSION),
    );

    // System prompts go in a top-level field, not in the message list.
    let (system, chat): (Vec<_>, Vec<_>) = request
        .messages
        .iter()
        .partition(|m| m.role == "system");

    let messages: Vec<Value> = chat
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content.to_string_content()}))
        .collect();

    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(model.to_string()));
    payload.insert("messages".to_string(), Value::Array(messages));
    payload.insert(
        "max_tokens".to_string(),
        request
            .max_tokens
            .or(default_max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
            .into(),
    );

    if !system.is_empty() {
        let prompt = system
            .iter()
            .map(|m| m.content.to_string_content())
            .collect::<Vec<_>>()
            .join("\n\n");
        payload.insert("system".to_string(), Value::String(prompt));
    }
    if let Some(temperature) = request.temperature {
        payload.insert("temperature".to_string(), temperature.into());
    }
    if let Some(top_p) = request.top_p {
        payload.insert("top_p".to_string(), top_p.into());
    }
    if let Some(stop) = request.stop_sequences() {
        payload.insert("stop_sequences".to_string(), stop.into());
    }

    Ok(OutboundRequest {
        url: format!("{}/messages", base_url.trim_end_matches('/')),
        headers,
        payload: Value::Object(payload),
    })
}
