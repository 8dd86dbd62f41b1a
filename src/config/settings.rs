//! Runtime Settings
//!
//! Bind address, key selection strategy and env file location.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Strategy for choosing among matching keys
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Rotate through matching keys sequentially, one counter per model
    RoundRobin,

    /// Uniform random choice across every matching key
    #[default]
    Random,
}

impl FromStr for SelectionStrategy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" => Ok(SelectionStrategy::RoundRobin),
            "random" => Ok(SelectionStrategy::Random),
            other => Err(GatewayError::Config(format!(
                "Unknown selection strategy '{}'. Expected 'random' or 'round_robin'",
                other
            ))),
        }
    }
}

/// Settings read from the process environment
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Key selection strategy
    pub strategy: SelectionStrategy,

    /// Env file the save endpoint writes to
    pub env_file: PathBuf,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            strategy: SelectionStrategy::default(),
            env_file: PathBuf::from(".env"),
        }
    }
}

impl GatewaySettings {
    /// Read settings from `KEYGATE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(addr) = lookup("KEYGATE_BIND") {
            settings.bind_addr = addr.parse().map_err(|e| {
                GatewayError::Config(format!("Invalid KEYGATE_BIND '{}': {}", addr, e))
            })?;
        }
        if let Some(strategy) = lookup("KEYGATE_SELECTION") {
            settings.strategy = strategy.parse()?;
        }
        if let Some(path) = lookup("KEYGATE_ENV_FILE") {
            settings.env_file = PathBuf::from(path);
        }

        Ok(settings)
    }
}
