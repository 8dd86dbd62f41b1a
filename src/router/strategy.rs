//! Key Selection
//!
//! Parses the requested model field and picks one credential among the
//! matches using the configured strategy.

use crate::config::SelectionStrategy;
use crate::error::{GatewayError, Result};
use crate::router::key_pool::Credential;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Models a single request is willing to accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateModels(Vec<String>);

impl CandidateModels {
    /// Parse a model field such as "gpt-4o" or "gpt-4o-mini, gpt-4o"
    pub fn parse(field: &str) -> Result<Self> {
        let models: Vec<String> = field
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        if models.is_empty() {
            return Err(GatewayError::Validation(
                "Missing 'model' in request".to_string(),
            ));
        }
        Ok(Self(models))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Picks one credential out of the filtered matches
#[derive(Debug)]
pub struct KeySelector {
    strategy: SelectionStrategy,

    /// Round-robin counters keyed by the set of matched models
    counters: Mutex<HashMap<String, u64>>,
}

impl KeySelector {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Choose among matches already filtered against the candidate models
    pub fn pick<'a>(&self, matches: &[&'a Credential]) -> Option<&'a Credential> {
        if matches.is_empty() {
            return None;
        }

        match self.strategy {
            SelectionStrategy::RoundRobin => self.round_robin(matches),
            SelectionStrategy::Random => Self::random(matches),
        }
    }

    /// Counter key for a set of matches: sorted, de-duplicated model names.
    /// Derived from pool entries, never from the client's model field.
    fn rotation_key(matches: &[&Credential]) -> String {
        let mut models: Vec<&str> = matches.iter().map(|c| c.model.as_str()).collect();
        models.sort_unstable();
        models.dedup();
        models.join(",")
    }

    /// Cycle through matches in pool order, one counter per matched model set
    fn round_robin<'a>(&self, matches: &[&'a Credential]) -> Option<&'a Credential> {
        let key = Self::rotation_key(matches);
        let mut counters = self.counters.lock();
        let counter = counters.entry(key).or_insert(0);
        let selected = matches[(*counter % matches.len() as u64) as usize];
        *counter = counter.wrapping_add(1);
        Some(selected)
    }

    /// Uniform choice across every match
    fn random<'a>(matches: &[&'a Credential]) -> Option<&'a Credential> {
        matches.choose(&mut rand::thread_rng()).copied()
    }

    /// Current round-robin counter for a model (or comma-joined sorted set)
    #[cfg(test)]
    fn counter(&self, models: &str) -> u64 {
        self.counters.lock().get(models).copied().unwrap_or(0)
    }
}

impl Default for KeySelector {
    fn default() -> Self {
        Self::new(SelectionStrategy::default())
    }
}
