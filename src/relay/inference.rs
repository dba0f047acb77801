//! # Inference Backend
//!
//! [`InferenceBackend`] is the seam between the relay and the vision model. The
//! production implementation, [`DashScopeClient`], makes exactly one bearer-authenticated
//! `POST {base_url}/chat/completions` per call with a bounded timeout. It never retries.
//!
//! Tests substitute their own backend to exercise the relay without network access.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::relay::types::ChatCompletionRequest;

/// Anything that can turn a chat-completions request into guess text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends one request.
    ///
    /// # Returns
    ///
    /// `Ok(Some(text))` with the first choice's message text, `Ok(None)` when the
    /// response carried no usable text, or a [`RelayError`] in the upstream or
    /// internal class.
    async fn complete(
        &self,
        credential: &str,
        request: &ChatCompletionRequest,
    ) -> RelayResult<Option<String>>;
}

/// Extracts `choices[0].message.content` from a chat-completions response.
///
/// Accepts either a plain string or an array of `{type: "text", text}` parts, which
/// some compatible endpoints return. Only empty text counts as absent; whitespace
/// is passed through as the model wrote it.
pub fn extract_guess(response: &Value) -> Option<String> {
    let content = response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?;

    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}

/// reqwest-backed client for DashScope's OpenAI-compatible mode.
#[derive(Debug, Clone)]
pub struct DashScopeClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl DashScopeClient {
    /// Builds a client for `config.base_url` with `config.timeout` applied to every call.
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::internal_from("build_http_client", e))?;
        Ok(Self {
            http,
            endpoint: config.chat_completions_url(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::timeout("chat_completions", self.timeout.as_millis() as u64)
                .with_metadata("endpoint", self.endpoint.clone())
        } else {
            RelayError::internal_from("chat_completions", e)
                .with_metadata("endpoint", self.endpoint.clone())
        }
    }
}

#[async_trait]
impl InferenceBackend for DashScopeClient {
    async fn complete(
        &self,
        credential: &str,
        request: &ChatCompletionRequest,
    ) -> RelayResult<Option<String>> {
        debug!(endpoint = %self.endpoint, model = %request.model, "Sending chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Inference API call failed");
            return Err(RelayError::upstream(status.as_u16(), body)
                .with_operation("chat_completions"));
        }

        let payload: Value = response.json().await.map_err(|e| self.classify(e))?;
        Ok(extract_guess(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_string_content() {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": "a cat"}}]});
        assert_eq!(extract_guess(&response), Some("a cat".to_string()));
    }

    #[test]
    fn test_extract_part_content() {
        let response = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "a "},
            {"type": "text", "text": "house"}
        ]}}]});
        assert_eq!(extract_guess(&response), Some("a house".to_string()));
    }

    #[test]
    fn test_extract_missing_content() {
        assert_eq!(extract_guess(&json!({})), None);
        assert_eq!(extract_guess(&json!({"choices": []})), None);
        assert_eq!(extract_guess(&json!({"choices": [{"message": {}}]})), None);
        assert_eq!(extract_guess(&json!({"choices": [{"message": {"content": null}}]})), None);
        assert_eq!(extract_guess(&json!({"choices": [{"message": {"content": ""}}]})), None);
    }

    #[test]
    fn test_extract_keeps_whitespace_content() {
        let response = json!({"choices": [{"message": {"content": "  "}}]});
        assert_eq!(extract_guess(&response), Some("  ".to_string()));
    }

    #[test]
    fn test_client_endpoint() {
        let config = RelayConfig::default().with_base_url("http://127.0.0.1:9/v1/");
        let client = DashScopeClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }
}
