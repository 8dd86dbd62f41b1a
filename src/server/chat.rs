//! Chat completion handler

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;

use super::keys::json_body;
use super::AppState;
use crate::api::ChatRequest;
use crate::error::Result;

/// Forward a chat completion through the gateway and relay the provider body
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let request: ChatRequest = serde_json::from_value(json_body(body)?)?;
    let response = state.gateway.chat_completion(request, &headers).await?;
    Ok(Json(response))
}
