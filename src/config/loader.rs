//! Configuration Loader
//!
//! Handles loading and merging provider endpoint tables from multiple sources.

use crate::config::provider::ProvidersConfig;
use crate::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names an extra provider table that overrides every other source
const PROVIDERS_PATH_ENV: &str = "KEYGATE_PROVIDERS_PATH";

const BUILTIN_PROVIDERS: &str = include_str!("../../providers.json");

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    config: ProvidersConfig,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self::builtin()?;

        // Files on disk can override built-ins
        loader.load_from_default_paths()?;

        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_file(path)?;
        Ok(loader)
    }

    /// Create a loader holding only the built-in provider table
    pub fn builtin() -> Result<Self> {
        let mut loader = Self {
            config: ProvidersConfig::default(),
        };
        loader.load_builtin_defaults()?;
        Ok(loader)
    }

    /// Load built-in provider defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let config: ProvidersConfig = serde_json::from_str(BUILTIN_PROVIDERS).map_err(|e| {
            GatewayError::Config(format!("Failed to parse built-in providers.json: {}", e))
        })?;

        self.merge_config(config);
        Ok(())
    }

    /// Load every override file that exists, in search order
    fn load_from_default_paths(&mut self) -> Result<()> {
        let paths = Self::search_paths(
            std::env::var(PROVIDERS_PATH_ENV).ok(),
            dirs::config_dir(),
        );
        for path in paths {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Override files, lowest precedence first: `<config_dir>/keygate/providers.json`,
    /// then `./keygate.json`, then the file named by `KEYGATE_PROVIDERS_PATH`
    fn search_paths(explicit: Option<String>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = config_dir {
            paths.push(config_dir.join("keygate").join("providers.json"));
        }
        paths.push(PathBuf::from("keygate.json"));
        if let Some(explicit) = explicit.filter(|p| !p.trim().is_empty()) {
            paths.push(PathBuf::from(explicit));
        }
        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ProvidersConfig = serde_json::from_str(&content).map_err(|e| {
            GatewayError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Self::check_endpoints(&config, &path.display().to_string())?;

        debug!(path = %path.display(), providers = config.providers.len(), "Loaded provider config");
        self.merge_config(config);
        Ok(())
    }

    /// Every provider needs an identifier usable in a credential and an
    /// absolute http(s) base URL
    fn check_endpoints(config: &ProvidersConfig, source: &str) -> Result<()> {
        for (id, provider) in &config.providers {
            if id.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "{}: provider identifier must not be empty",
                    source
                )));
            }
            let base = provider.base_url.trim();
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(GatewayError::Config(format!(
                    "{}: provider '{}' has base_url '{}', expected an http(s) URL",
                    source, id, provider.base_url
                )));
            }
        }
        Ok(())
    }

    /// Merge another config into this one (later configs override earlier)
    fn merge_config(&mut self, other: ProvidersConfig) {
        for (name, provider) in other.providers {
            if let Some(previous) = self.config.providers.get(&name) {
                if previous.kind != provider.kind {
                    info!(
                        provider = %name,
                        from = ?previous.kind,
                        to = ?provider.kind,
                        "Provider protocol overridden"
                    );
                }
            }
            self.config.providers.insert(name, provider);
        }
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ProvidersConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> ProvidersConfig {
        self.config
    }
}
