//! OpenAI-compatible chat completions (also used by Deepseek and Grok)

use super::OutboundRequest;
use crate::api::ChatRequest;
use crate::client::headers;
use crate::error::Result;
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

pub(crate) fn build(
    base_url: &str,
    secret: &str,
    model: &str,
    request: &ChatRequest,
) -> Result<OutboundRequest> {
    let mut headers = headers::json_headers();
    headers.insert(AUTHORIZATION, headers::bearer(secret)?);

    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(model.to_string()));
    payload.insert("messages".to_string(), serde_json::to_value(&request.messages)?);
    request.insert_sampling_params(&mut payload);

    Ok(OutboundRequest {
        url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        headers,
        payload: Value::Object(payload),
    })
}
