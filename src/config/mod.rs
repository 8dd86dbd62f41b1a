//! Configuration Module
//!
//! Handles provider endpoint tables, the initial key list and runtime settings.

pub mod keys;
pub mod loader;
pub mod provider;
pub mod settings;

pub use keys::{load_credentials_from_env, parse_credentials, save_credentials, LLM_KEYS_ENV};
pub use loader::ConfigLoader;
pub use provider::{ProviderConfig, ProviderKind, ProvidersConfig};
pub use settings::{GatewaySettings, SelectionStrategy};
