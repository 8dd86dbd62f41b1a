//! API Module
//!
//! Provider-neutral chat request types.

pub mod chat;

pub use chat::{ChatRequest, Message, MessageContent};
