//! Keygate - credential-pooling LLM gateway
//!
//! Clients send one generic chat-completion request naming one or more
//! acceptable models. The gateway picks a matching API key from a shared pool,
//! translates the request into the selected provider's wire format, and relays
//! the provider's response back unmodified.

use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod router;
pub mod server;

use api::ChatRequest;
use client::HttpClient;
use config::{ProvidersConfig, SelectionStrategy};
use error::{GatewayError, Result};
use providers::ProviderRegistry;
use router::{CandidateModels, Credential, KeyPool, KeySelector};

/// Routes chat requests through the key pool to a provider adapter
pub struct Gateway {
    /// Shared credential pool
    pool: Arc<KeyPool>,

    /// Key selection strategy and its counters
    selector: KeySelector,

    /// Provider adapters by identifier
    registry: ProviderRegistry,

    /// HTTP client
    http_client: HttpClient,
}

impl Gateway {
    /// Create a gateway from its parts
    pub fn new(
        pool: Arc<KeyPool>,
        selector: KeySelector,
        registry: ProviderRegistry,
    ) -> Result<Self> {
        Ok(Self {
            pool,
            selector,
            registry,
            http_client: HttpClient::new()?,
        })
    }

    /// Create a gateway from a provider table, strategy and initial keys
    pub fn from_config(
        providers: &ProvidersConfig,
        strategy: SelectionStrategy,
        credentials: Vec<Credential>,
    ) -> Result<Self> {
        let registry = ProviderRegistry::from_config(providers);
        info!(
            keys = credentials.len(),
            providers = ?registry.ids(),
            ?strategy,
            "Gateway configured"
        );
        Self::new(
            Arc::new(KeyPool::new(credentials)),
            KeySelector::new(strategy),
            registry,
        )
    }

    /// The live key pool
    pub fn pool(&self) -> &Arc<KeyPool> {
        &self.pool
    }

    /// Select a credential for any of the candidate models
    pub fn select(&self, candidates: &[String]) -> Option<Credential> {
        self.pool.select(&self.selector, candidates)
    }

    /// Handle one chat completion request
    ///
    /// The pool lock is only held while selecting; the upstream call runs
    /// without it. Dropping the returned future cancels the upstream call.
    pub async fn chat_completion(&self, request: ChatRequest, inbound: &HeaderMap) -> Result<Value> {
        let field = request
            .model
            .as_deref()
            .ok_or_else(|| GatewayError::Validation("Missing 'model' in request".to_string()))?;
        let candidates = CandidateModels::parse(field)?;

        let selected = self
            .select(candidates.as_slice())
            .ok_or_else(|| GatewayError::NoEligibleKey(candidates.clone().into_vec()))?;

        let adapter = self
            .registry
            .get(&selected.provider)
            .ok_or_else(|| GatewayError::UnimplementedProvider(selected.provider.clone()))?;

        debug!(
            provider = %selected.provider,
            model = %selected.model,
            "Dispatching chat completion"
        );

        adapter
            .send_chat_completion(
                &self.http_client,
                &selected.secret,
                &selected.model,
                &request,
                inbound,
            )
            .await
    }
}
