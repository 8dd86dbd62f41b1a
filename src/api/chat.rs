//! Generic Chat Request
//!
//! The provider-neutral request shape clients send to the gateway.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message in a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant", or "tool"
    pub role: String,

    /// Message content (can be string or array of content parts)
    #[serde(default)]
    pub content: MessageContent,

    /// Optional name for the message author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remaining fields (tool calls, tool call ids) passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: MessageContent::Text(content.into()),
            name: None,
            extra: Map::new(),
        }
    }
}

/// Message content - can be a simple string or array of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple string content
    Text(String),

    /// Array of content parts (for multimodal), kept verbatim
    Parts(Vec<Value>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Convert to string (concatenating text parts if needed)
    pub fn to_string_content(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Chat completion request as received from clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// One model name, or a comma-separated list of acceptable models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Messages in the conversation
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Stop sequence or list of sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Value>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: Some(model.into()),
            messages,
            ..Default::default()
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Stop sequences normalized to a list of strings
    pub fn stop_sequences(&self) -> Option<Vec<String>> {
        match self.stop.as_ref()? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Optional sampling parameters shared by OpenAI-style payloads
    pub(crate) fn insert_sampling_params(&self, payload: &mut Map<String, Value>) {
        if let Some(max_tokens) = self.max_tokens {
            payload.insert("max_tokens".to_string(), max_tokens.into());
        }
        if let Some(temperature) = self.temperature {
            payload.insert("temperature".to_string(), temperature.into());
        }
        if let Some(top_p) = self.top_p {
            payload.insert("top_p".to_string(), top_p.into());
        }
        if let Some(stop) = &self.stop {
            payload.insert("stop".to_string(), stop.clone());
        }
    }
}
