//! HTTP Client
//!
//! Async HTTP client for upstream provider calls.

use crate::error::{GatewayError, Result};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client shared by every provider adapter
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minute timeout for long completions
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a JSON body and return the decoded JSON response verbatim
    ///
    /// Non-2xx responses with a JSON body are relayed as-is so callers see the
    /// provider's own error payload. Transport failures and non-JSON bodies are
    /// surfaced as [`GatewayError::Upstream`].
    pub async fn post_json<T>(
        &self,
        url: &str,
        body: &T,
        headers: HeaderMap,
        provider: &str,
    ) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        debug!(provider, url, "Sending upstream request");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(provider, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::from_transport(provider, e))?;

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            GatewayError::upstream(
                provider,
                format!(
                    "status {}, body is not JSON ({}): {}",
                    status,
                    e,
                    &text[..floor_char_boundary(&text, 500)]
                ),
            )
        })?;

        if status.is_success() {
            debug!(provider, %status, "Upstream request succeeded");
        } else {
            warn!(provider, %status, "Upstream returned an error status, relaying body");
        }

        Ok(parsed)
    }
}

/// Largest index <= `max` that falls on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_body_is_relayed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/chat/completions", server.url());
        let body = client
            .post_json(&url, &json!({}), HeaderMap::new(), "openai")
            .await
            .unwrap();

        assert_eq!(body["error"]["message"], "quota exceeded");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_json_body_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/chat/completions", server.url());
        let err = client
            .post_json(&url, &json!({}), HeaderMap::new(), "openai")
            .await
            .unwrap_err();

        match err {
            GatewayError::Upstream { provider, message } => {
                assert_eq!(provider, "openai");
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_error() {
        let client = HttpClient::new().unwrap();
        let err = client
            .post_json("http://127.0.0.1:1/chat/completions", &json!({}), HeaderMap::new(), "grok")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Upstream { .. }));
    }

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("abc", 500), 3);
        assert_eq!(floor_char_boundary("héllo", 2), 1);
    }
}
