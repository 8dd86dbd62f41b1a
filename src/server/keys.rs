//! Key management handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::config::save_credentials;
use crate::error::{GatewayError, Result};
use crate::router::Credential;

/// Body for add and delete requests
#[derive(Debug, Default, Deserialize)]
pub struct KeyPayload {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// `{"success": true}`
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

fn required(field: &Option<String>) -> Result<&str> {
    field
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| GatewayError::Validation("Missing required fields".to_string()))
}

pub(super) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| GatewayError::Validation(rejection.body_text()))
}

/// List every key in the pool
pub async fn list_keys(State(state): State<Arc<AppState>>) -> Json<Vec<Credential>> {
    Json(state.gateway.pool().list())
}

/// Add a key to the in-memory pool (not persisted until saved)
pub async fn add_key(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<KeyPayload>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let payload = json_body(body)?;
    let provider = required(&payload.provider)?;
    let model = required(&payload.model)?;
    let api_key = required(&payload.api_key)?;

    state.gateway.pool().add(provider, model, api_key)?;
    Ok(SuccessResponse::ok())
}

/// Remove the first key matching provider and model
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<KeyPayload>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let payload = json_body(body)?;
    let provider = required(&payload.provider)?;
    let model = required(&payload.model)?;

    if state.gateway.pool().delete(provider, model) {
        Ok(SuccessResponse::ok())
    } else {
        Err(GatewayError::KeyNotFound {
            provider: provider.to_string(),
            model: model.to_string(),
        })
    }
}

/// Write the current pool to the env file
pub async fn save_keys(State(state): State<Arc<AppState>>) -> Result<Json<SuccessResponse>> {
    let credentials = state.gateway.pool().list();
    let path = state.env_file.clone();

    tokio::task::spawn_blocking(move || save_credentials(&path, &credentials))
        .await
        .map_err(|e| GatewayError::Persist(e.to_string()))??;

    tracing::info!(path = %state.env_file.display(), "Saved keys");
    Ok(SuccessResponse::ok())
}
