//! Router Module
//!
//! Handles the credential pool and key selection.

pub mod key_pool;
pub mod strategy;

pub use key_pool::{Credential, KeyPool};
pub use strategy::{CandidateModels, KeySelector};
