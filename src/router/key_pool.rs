//! API Key Pool Management
//!
//! Holds every credential known to the gateway and hands out snapshots and
//! selections under a single lock.

use crate::error::{GatewayError, Result};
use crate::router::strategy::KeySelector;
use parking_lot::RwLock;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// A single API key bound to one provider and one model name
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Provider identifier (e.g., "openai", "anthropic")
    pub provider: String,

    /// Model name this key is used for
    pub model: String,

    /// The actual API key value
    #[serde(rename = "api_key")]
    pub secret: String,
}

impl Credential {
    /// Create a credential, rejecting empty fields
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            provider: provider.into(),
            model: model.into(),
            secret: secret.into(),
        };
        credential.validate()?;
        Ok(credential)
    }

    /// Check that every field is non-empty and the secret fits in a header
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("provider", &self.provider),
            ("model", &self.model),
            ("api_key", &self.secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(GatewayError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        if HeaderValue::from_str(&self.secret).is_err() {
            return Err(GatewayError::Validation(
                "api_key contains characters not allowed in an HTTP header".to_string(),
            ));
        }
        Ok(())
    }

    fn is_identified_by(&self, provider: &str, model: &str) -> bool {
        self.provider == provider && self.model == model
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Ordered pool of credentials shared by every request
#[derive(Debug, Default)]
pub struct KeyPool {
    entries: RwLock<Vec<Credential>>,
}

impl KeyPool {
    /// Create a pool from an initial list of credentials
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            entries: RwLock::new(credentials),
        }
    }

    /// Snapshot of the current pool
    pub fn list(&self) -> Vec<Credential> {
        self.entries.read().clone()
    }

    /// Number of credentials in the pool
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append a credential. Duplicates for the same pair are kept for rotation.
    pub fn add(&self, provider: &str, model: &str, secret: &str) -> Result<()> {
        let credential = Credential::new(provider, model, secret)?;
        self.entries.write().push(credential);
        info!(provider, model, "Added key to pool");
        Ok(())
    }

    /// Remove the first credential matching (provider, model)
    pub fn delete(&self, provider: &str, model: &str) -> bool {
        let mut entries = self.entries.write();
        match entries
            .iter()
            .position(|c| c.is_identified_by(provider, model))
        {
            Some(idx) => {
                entries.remove(idx);
                drop(entries);
                info!(provider, model, "Removed key from pool");
                true
            }
            None => false,
        }
    }

    /// Pick a credential for any of the candidate models
    ///
    /// Matches are filtered fresh under the read lock, so concurrent add or
    /// delete calls are reflected on the next selection. The returned value is
    /// an owned copy; the lock is released before the caller uses it.
    pub fn select(&self, selector: &KeySelector, candidates: &[String]) -> Option<Credential> {
        let entries = self.entries.read();
        let matches: Vec<&Credential> = entries
            .iter()
            .filter(|c| candidates.iter().any(|m| *m == c.model))
            .collect();

        let selected = selector.pick(&matches).cloned();
        debug!(
            candidates = ?candidates,
            matches = matches.len(),
            selected = selected.as_ref().map(|c| c.provider.as_str()),
            "Key selection"
        );
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionStrategy;
    use std::sync::Arc;

    fn cred(provider: &str, model: &str, secret: &str) -> Credential {
        Credential::new(provider, model, secret).unwrap()
    }

    fn count(pool: &KeyPool, provider: &str, model: &str) -> usize {
        pool.list()
            .iter()
            .filter(|c| c.provider == provider && c.model == model)
            .count()
    }

    #[test]
    fn test_credential_rejects_empty_fields() {
        assert!(Credential::new("openai", "gpt-4o", "").is_err());
        assert!(Credential::new("", "gpt-4o", "k1").is_err());
        assert!(Credential::new("openai", "  ", "k1").is_err());
        assert!(Credential::new("openai", "gpt-4o", "k1").is_ok());
    }

    #[test]
    fn test_credential_rejects_header_breaking_secret() {
        let err = Credential::new("openai", "gpt-4o", "sk-1\r\nx-evil: 1").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(Credential::new("openai", "gpt-4o", "sk\u{7f}").is_err());

        let pool = KeyPool::default();
        assert!(pool.add("openai", "gpt-4o", "sk-1\nsk-2").is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", cred("openai", "gpt-4o", "sk-very-secret"));
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("gpt-4o"));
    }

    #[test]
    fn test_credential_serializes_as_api_key() {
        let json = serde_json::to_value(cred("openai", "gpt-4o", "k1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"provider": "openai", "model": "gpt-4o", "api_key": "k1"})
        );
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let pool = KeyPool::new(vec![cred("openai", "gpt-4o", "k1")]);
        let mut snapshot = pool.list();
        snapshot.clear();
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_add_allows_duplicates() {
        let pool = KeyPool::default();
        pool.add("openai", "gpt-4o", "k1").unwrap();
        pool.add("openai", "gpt-4o", "k2").unwrap();
        pool.add("openai", "gpt-4o", "k1").unwrap();

        assert_eq!(count(&pool, "openai", "gpt-4o"), 3);
        assert_eq!(pool.list().last().unwrap().secret, "k1");
    }

    #[test]
    fn test_add_rejects_missing_secret() {
        let pool = KeyPool::default();
        assert!(pool.add("openai", "gpt-4o", "").is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_delete_removes_first_match_only() {
        let pool = KeyPool::new(vec![
            cred("openai", "gpt-4o", "k1"),
            cred("anthropic", "claude-3", "kA"),
            cred("openai", "gpt-4o", "k2"),
        ]);

        assert!(pool.delete("openai", "gpt-4o"));
        assert_eq!(count(&pool, "openai", "gpt-4o"), 1);

        let remaining = pool.list();
        assert_eq!(remaining[0].secret, "kA");
        assert_eq!(remaining[1].secret, "k2");
    }

    #[test]
    fn test_delete_absent_pair_leaves_pool_unchanged() {
        let pool = KeyPool::new(vec![cred("openai", "gpt-4o", "k1")]);
        let before = pool.list();

        assert!(!pool.delete("openai", "gpt-4o-mini"));
        assert!(!pool.delete("anthropic", "gpt-4o"));
        assert_eq!(pool.list(), before);
    }

    #[test]
    fn test_select_sees_mutations_immediately() {
        let pool = KeyPool::new(vec![cred("openai", "gpt-4o", "k1")]);
        let selector = KeySelector::new(SelectionStrategy::RoundRobin);
        let candidates = vec!["gpt-4o".to_string()];

        assert_eq!(pool.select(&selector, &candidates).unwrap().secret, "k1");
        assert!(pool.delete("openai", "gpt-4o"));
        assert!(pool.select(&selector, &candidates).is_none());

        pool.add("deepseek", "gpt-4o", "k9").unwrap();
        assert_eq!(pool.select(&selector, &candidates).unwrap().secret, "k9");
    }

    #[test]
    fn test_concurrent_mutation_never_tears_list() {
        let base: Vec<Credential> = (0..8)
            .map(|i| cred("openai", "gpt-4o", &format!("base-{i}")))
            .collect();
        let pool = Arc::new(KeyPool::new(base.clone()));
        let writers = 4;

        std::thread::scope(|scope| {
            for w in 0..writers {
                let pool = Arc::clone(&pool);
                scope.spawn(move || {
                    let provider = format!("writer-{w}");
                    for _ in 0..500 {
                        pool.add(&provider, "gpt-4o", "tmp").unwrap();
                        assert!(pool.delete(&provider, "gpt-4o"));
                    }
                });
            }

            let pool = Arc::clone(&pool);
            let base = base.clone();
            scope.spawn(move || {
                for _ in 0..2000 {
                    let snapshot = pool.list();
                    assert!(snapshot.len() >= base.len());
                    assert!(snapshot.len() <= base.len() + writers);

                    for original in &base {
                        assert_eq!(snapshot.iter().filter(|c| *c == original).count(), 1);
                    }
                    for w in 0..writers {
                        let provider = format!("writer-{w}");
                        assert!(snapshot.iter().filter(|c| c.provider == provider).count() <= 1);
                    }
                }
            });
        });

        assert_eq!(pool.list(), base);
    }
}
