//! Provider Adapters
//!
//! Translates a generic chat request into each provider's wire format and
//! issues the upstream call. Adapters are looked up by provider identifier in
//! a registry that is fixed at startup.

mod anthropic;
mod gemini;
mod openai;

use crate::api::ChatRequest;
use crate::client::{headers, HttpClient};
use crate::config::{ConfigLoader, ProviderConfig, ProviderKind, ProvidersConfig};
use crate::error::Result;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

/// A fully built upstream call
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub payload: Value,
}

/// Translator and transport for one upstream provider
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    /// Provider identifier as it appears in credentials
    id: String,

    config: ProviderConfig,

    /// Base URL resolved once at startup
    base_url: String,
}

impl ProviderAdapter {
    pub fn new(id: impl Into<String>, config: ProviderConfig) -> Self {
        let base_url = config.get_base_url();
        Self {
            id: id.into(),
            config,
            base_url,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    /// Build the provider-specific URL, headers and payload
    pub fn build_request(
        &self,
        secret: &str,
        model: &str,
        request: &ChatRequest,
        inbound: &HeaderMap,
    ) -> Result<OutboundRequest> {
        let mut outbound = match self.config.kind {
            ProviderKind::Openai | ProviderKind::Deepseek | ProviderKind::Grok => {
                openai::build(&self.base_url, secret, model, request)?
            }
            ProviderKind::Anthropic => anthropic::build(
                &self.base_url,
                secret,
                model,
                request,
                self.config.default_max_tokens,
            )?,
            ProviderKind::Gemini => gemini::build(&self.base_url, secret, model, request, inbound)?,
        };

        headers::apply_extra(&mut outbound.headers, &self.config.headers);
        Ok(outbound)
    }

    /// Send a chat completion and return the provider's JSON body untouched
    pub async fn send_chat_completion(
        &self,
        http: &HttpClient,
        secret: &str,
        model: &str,
        request: &ChatRequest,
        inbound: &HeaderMap,
    ) -> Result<Value> {
        let outbound = self.build_request(secret, model, request, inbound)?;
        http.post_json(&outbound.url, &outbound.payload, outbound.headers, &self.id)
            .await
    }
}

/// Immutable lookup from provider identifier to adapter
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<String, ProviderAdapter>,
}

impl ProviderRegistry {
    /// Build the registry from a provider endpoint table
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let adapters = config
            .providers
            .iter()
            .map(|(id, provider)| (id.clone(), ProviderAdapter::new(id.clone(), provider.clone())))
            .collect();
        Self { adapters }
    }

    /// Registry with only the built-in providers
    pub fn builtin() -> Result<Self> {
        Ok(Self::from_config(ConfigLoader::builtin()?.config()))
    }

    pub fn get(&self, provider: &str) -> Option<&ProviderAdapter> {
        self.adapters.get(provider)
    }

    /// Registered provider identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
