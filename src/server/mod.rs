//! HTTP server module

mod chat;
mod keys;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::GatewayError;
use crate::Gateway;

pub use keys::{KeyPayload, SuccessResponse};

/// Shared state for every handler
pub struct AppState {
    pub gateway: Gateway,

    /// Env file written by the save endpoint
    pub env_file: PathBuf,
}

impl AppState {
    pub fn new(gateway: Gateway, env_file: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            env_file: env_file.into(),
        }
    }
}

impl GatewayError {
    /// HTTP status used when this error is returned to a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::KeyNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::NoEligibleKey(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::UnimplementedProvider(_) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Persist(_) | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(%status, error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/keys",
            get(keys::list_keys)
                .post(keys::add_key)
                .delete(keys::delete_key),
        )
        .route("/api/keys/save", post(keys::save_keys))
        .route("/chat/completions", post(chat::chat_completions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the gateway on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
