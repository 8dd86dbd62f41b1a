//! Provider Configuration
//!
//! Defines the endpoint table for upstream LLM providers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Provider configurations keyed by provider identifier
    pub providers: HashMap<String, ProviderConfig>,
}

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat completions and compatible APIs
    Openai,
    Anthropic,
    Gemini,
    Deepseek,
    Grok,
}

/// Configuration for a single LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Wire protocol used for this provider
    pub kind: ProviderKind,

    /// Base URL for the API
    pub base_url: String,

    /// Optional environment variable for custom base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_env: Option<String>,

    /// Additional headers to send with requests
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// max_tokens sent when the client omits it (required by some providers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,
}

impl ProviderConfig {
    /// Create a config with only a kind and base URL
    pub fn new(kind: ProviderKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            api_base_env: None,
            headers: HashMap::new(),
            default_max_tokens: None,
        }
    }

    /// Get the effective base URL (from env var if configured, otherwise default)
    pub fn get_base_url(&self) -> String {
        if let Some(env_var) = &self.api_base_env {
            if let Ok(url) = std::env::var(env_var) {
                if !url.is_empty() {
                    return url;
                }
            }
        }
        self.base_url.clone()
    }
}
