//! # Relay Handler
//!
//! [`Relay::analyze`] is the whole request lifecycle minus HTTP:
//!
//! 1. Reject a missing or empty image (`MissingInput`, 400)
//! 2. Reject when no credential is configured (`Configuration`, 500), before any
//!    outbound call is attempted
//! 3. Resolve the model profile (never fails)
//! 4. Build and dispatch one chat-completions request
//! 5. Map the first choice's text, or the placeholder, into an [`AnalyzeReply`]
//!
//! The relay holds no mutable state. Concurrent calls are independent.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult, Retryable};
use crate::profiles;
use crate::relay::inference::InferenceBackend;
use crate::relay::types::{AnalyzeReply, AnalyzeRequest, ChatCompletionRequest};

/// Guess text used when the model answers without any text.
pub const UNRECOGNIZED_GUESS: &str = "Unable to recognize";

/// Stateless request handler shared by every connection.
#[derive(Clone)]
pub struct Relay {
    config: Arc<RelayConfig>,
    backend: Arc<dyn InferenceBackend>,
}

impl Relay {
    pub fn new(config: Arc<RelayConfig>, backend: Arc<dyn InferenceBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Runs one analyze request end to end.
    pub async fn analyze(&self, request: AnalyzeRequest) -> RelayResult<AnalyzeReply> {
        let image_data = request
            .image_data
            .filter(|image| !image.is_empty())
            .ok_or_else(|| RelayError::missing_input("imageData"))?;

        let credential = self.config.credential().ok_or_else(|| {
            RelayError::configuration("DASHSCOPE_API_KEY", "no API credential is configured")
                .with_recovery_suggestion("Set DASHSCOPE_API_KEY or pass --api-key")
        })?;

        let profile = profiles::resolve(request.model_name.as_deref(), self.config.default_model());
        if let Some(requested) = request.model_name.as_deref().map(str::trim) {
            if !requested.is_empty() && requested != profile.name {
                warn!(requested, resolved = profile.name, "Unknown model profile, using fallback");
            }
        }

        let chat = ChatCompletionRequest::for_profile(profile, image_data);
        let started = Instant::now();
        let outcome = self.backend.complete(credential, &chat).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(guess) => {
                let recognized = guess.is_some();
                let guess = guess.unwrap_or_else(|| UNRECOGNIZED_GUESS.to_string());
                info!(profile = profile.name, elapsed_ms, recognized, "Drawing analyzed");
                Ok(AnalyzeReply {
                    guess,
                    success: true,
                    model: profile.display_name.to_string(),
                })
            }
            Err(e) => {
                warn!(
                    profile = profile.name,
                    elapsed_ms,
                    category = e.category(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Drawing analysis failed"
                );
                Err(e.with_metadata("profile", profile.name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed outcome.
    struct ScriptedBackend {
        answer: fn() -> RelayResult<Option<String>>,
        seen: Mutex<Vec<(String, ChatCompletionRequest)>>,
    }

    impl ScriptedBackend {
        fn new(answer: fn() -> RelayResult<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn complete(
            &self,
            credential: &str,
            request: &ChatCompletionRequest,
        ) -> RelayResult<Option<String>> {
            self.seen
                .lock()
                .unwrap()
                .push((credential.to_string(), request.clone()));
            (self.answer)()
        }
    }

    fn relay_with(config: RelayConfig, backend: Arc<ScriptedBackend>) -> Relay {
        Relay::new(Arc::new(config), backend)
    }

    #[tokio::test]
    async fn test_missing_image_is_rejected_first() {
        let backend = ScriptedBackend::new(|| Ok(Some("cat".into())));
        // No credential either: the image check still wins.
        let relay = relay_with(RelayConfig::default(), backend.clone());

        let error = relay.analyze(AnalyzeRequest::default()).await.unwrap_err();
        assert_eq!(error.status_code(), 400);

        let error = relay
            .analyze(AnalyzeRequest::new("", None))
            .await
            .unwrap_err();
        assert_eq!(error.category(), "missing_input");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_skips_backend() {
        let backend = ScriptedBackend::new(|| Ok(Some("cat".into())));
        let relay = relay_with(RelayConfig::default(), backend.clone());

        let error = relay
            .analyze(AnalyzeRequest::new("data:image/png;base64,AAAA", None))
            .await
            .unwrap_err();
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.category(), "configuration");
        assert!(error.recovery_suggestion().unwrap().contains("DASHSCOPE_API_KEY"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_uses_resolved_profile() {
        let backend = ScriptedBackend::new(|| Ok(Some("a bicycle".into())));
        let relay = relay_with(RelayConfig::default().with_api_key("sk-1"), backend.clone());

        let reply = relay
            .analyze(AnalyzeRequest::new("img", Some("qwen-vl-max".into())))
            .await
            .unwrap();
        assert_eq!(reply.guess, "a bicycle");
        assert!(reply.success);
        assert_eq!(reply.model, "Qwen-VL Max (Standard)");

        let seen = backend.seen.lock().unwrap();
        let (credential, request) = &seen[0];
        assert_eq!(credential, "sk-1");
        assert_eq!(request.model, "qwen-vl-max");
        assert_eq!(request.max_tokens, 120);
    }

    #[tokio::test]
    async fn test_unknown_model_falls_back_to_default() {
        let backend = ScriptedBackend::new(|| Ok(Some("a tree".into())));
        let relay = relay_with(RelayConfig::default().with_api_key("sk-1"), backend);

        let reply = relay
            .analyze(AnalyzeRequest::new("img", Some("gpt-imaginary".into())))
            .await
            .unwrap();
        assert_eq!(reply.model, profiles::default_profile().display_name);
    }

    #[tokio::test]
    async fn test_unknown_model_ignores_configured_default() {
        let backend = ScriptedBackend::new(|| Ok(Some("a tree".into())));
        let config = RelayConfig::default()
            .with_api_key("sk-1")
            .with_default_model("qwen-vl-max");
        let relay = relay_with(config, backend.clone());

        let reply = relay
            .analyze(AnalyzeRequest::new("img", Some("gpt-imaginary".into())))
            .await
            .unwrap();
        assert_eq!(reply.model, profiles::default_profile().display_name);

        let reply = relay.analyze(AnalyzeRequest::new("img", None)).await.unwrap();
        assert_eq!(reply.model, "Qwen-VL Max (Standard)");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_configured_default_model() {
        let backend = ScriptedBackend::new(|| Ok(Some("a tree".into())));
        let config = RelayConfig::default()
            .with_api_key("sk-1")
            .with_default_model("qwen-vl-plus");
        let relay = relay_with(config, backend);

        let reply = relay.analyze(AnalyzeRequest::new("img", None)).await.unwrap();
        assert_eq!(reply.model, "Qwen-VL Plus (Standard)");
    }

    #[tokio::test]
    async fn test_empty_answer_uses_placeholder() {
        let backend = ScriptedBackend::new(|| Ok(None));
        let relay = relay_with(RelayConfig::default().with_api_key("sk-1"), backend);

        let reply = relay.analyze(AnalyzeRequest::new("img", None)).await.unwrap();
        assert_eq!(reply.guess, UNRECOGNIZED_GUESS);
        assert!(reply.success);
    }

    #[tokio::test]
    async fn test_backend_failure_is_propagated() {
        let backend = ScriptedBackend::new(|| Err(RelayError::upstream(503, "overloaded")));
        let relay = relay_with(RelayConfig::default().with_api_key("sk-1"), backend);

        let error = relay.analyze(AnalyzeRequest::new("img", None)).await.unwrap_err();
        assert_eq!(error.status_code(), 503);
        assert_eq!(
            error.context().metadata.get("profile").map(String::as_str),
            Some(profiles::DEFAULT_PROFILE)
        );
    }
}
