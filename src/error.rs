//! Keygate Error Types
//!
//! Error handling for the key pool, dispatcher and provider adapters.

use thiserror::Error;

/// Main error type for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration errors (invalid JSON, wrong shape, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required request field is missing or empty
    #[error("{0}")]
    Validation(String),

    /// Delete requested for a (provider, model) pair absent from the pool
    #[error("Key not found for provider '{provider}' and model '{model}'")]
    KeyNotFound { provider: String, model: String },

    /// No credential matches any of the requested models
    #[error("No available key for model '{}'", .0.join(", "))]
    NoEligibleKey(Vec<String>),

    /// The selected credential names a provider with no registered adapter
    #[error("Provider '{0}' not implemented")]
    UnimplementedProvider(String),

    /// The outbound call failed or returned a body that is not JSON
    #[error("Upstream request to '{provider}' failed: {message}")]
    Upstream { provider: String, message: String },

    /// Writing the key pool to the env file failed
    #[error("Failed to save keys: {0}")]
    Persist(String),
}

impl GatewayError {
    /// Build an upstream error for a provider
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Classify a transport failure from reqwest
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timeout: {}", err)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else if err.is_decode() {
            format!("Failed to decode response: {}", err)
        } else {
            err.to_string()
        };
        Self::upstream(provider, message)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Validation(format!("Invalid request body: {}", err))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
