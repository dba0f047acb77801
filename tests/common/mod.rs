//! Common test utilities for the relay and board tests
//!
//! Provides a scripted inference backend, a stub chat-completions server, and
//! helpers that start the real router on an ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use sketch_guess::RelayConfig;
use sketch_guess::canvas::{Canvas, PaletteColor, Point};
use sketch_guess::error::RelayResult;
use sketch_guess::relay::types::ContentPart;
use sketch_guess::relay::{self, ChatCompletionRequest, InferenceBackend, Relay};
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "sk-test-key";

/// Relay settings with a credential and short timeout.
pub fn configured() -> RelayConfig {
    RelayConfig::default()
        .with_api_key(TEST_API_KEY)
        .with_timeout(Duration::from_secs(5))
}

/// A small drawing (a red horizontal line and a blue dot) as a PNG data URL.
pub fn sample_drawing() -> String {
    let mut canvas = Canvas::default();
    canvas.set_color(PaletteColor::Red.rgba());
    canvas.begin(Point::new(100.0, 250.0));
    canvas.extend(Point::new(400.0, 250.0));
    canvas.end();

    canvas.set_color(PaletteColor::Blue.rgba());
    canvas.set_width(12);
    canvas.begin(Point::new(250.0, 100.0));
    canvas.extend(Point::new(250.0, 100.0));
    canvas.end();

    canvas.export().expect("export sample drawing")
}

/// The image URL carried by a chat-completions request.
pub fn image_url(request: &ChatCompletionRequest) -> &str {
    request
        .messages
        .iter()
        .flat_map(|message| message.content.iter())
        .find_map(|part| match part {
            ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
            ContentPart::Text { .. } => None,
        })
        .expect("request carries an image")
}

type Answer = Box<dyn Fn(&ChatCompletionRequest) -> RelayResult<Option<String>> + Send + Sync>;
type Delay = Box<dyn Fn(&ChatCompletionRequest) -> Duration + Send + Sync>;

/// Inference backend that answers from a closure and records every call.
pub struct MockBackend {
    answer: Answer,
    delay: Delay,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, ChatCompletionRequest)>>,
}

impl MockBackend {
    pub fn new(
        answer: impl Fn(&ChatCompletionRequest) -> RelayResult<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            answer: Box::new(answer),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `text`.
    pub fn answering(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(Some(text.clone())))
    }

    /// Waits before answering, per request.
    pub fn with_delay(
        mut self,
        delay: impl Fn(&ChatCompletionRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Box::new(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(credential, request)` for every call, in arrival order.
    pub fn seen(&self) -> Vec<(String, ChatCompletionRequest)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn complete(
        &self,
        credential: &str,
        request: &ChatCompletionRequest,
    ) -> RelayResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));

        let delay = (self.delay)(request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.answer)(request)
    }
}

/// Starts the real router around `backend` and returns its root URL.
pub async fn spawn_relay(config: RelayConfig, backend: Arc<dyn InferenceBackend>) -> String {
    let relay = Arc::new(Relay::new(Arc::new(config), backend));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay");
    let addr = listener.local_addr().expect("relay address");
    tokio::spawn(async move {
        axum::serve(listener, relay::router(relay))
            .await
            .expect("relay server");
    });
    format!("http://{}", addr)
}

/// One request received by the stub upstream.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub authorization: Option<String>,
    pub body: Value,
}

struct StubState {
    status: StatusCode,
    body: Value,
    delay: Duration,
    calls: Arc<Mutex<Vec<UpstreamCall>>>,
}

/// Stub OpenAI-compatible upstream.
///
/// Answers every `POST /v1/chat/completions` with `status` and `body` after
/// `delay`. Returns the base URL (ending in `/v1`) and the call log.
pub async fn spawn_upstream(
    status: u16,
    body: Value,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<UpstreamCall>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(StubState {
        status: StatusCode::from_u16(status).expect("valid status"),
        body,
        delay,
        calls: calls.clone(),
    });

    let app = Router::new()
        .route("/v1/chat/completions", post(stub_completion))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream server");
    });

    (format!("http://{}/v1", addr), calls)
}

async fn stub_completion(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .calls
        .lock()
        .unwrap()
        .push(UpstreamCall { authorization, body });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.body.clone()))
}

/// A chat-completions answer whose first choice says `text`.
pub fn completion(text: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }
        ]
    })
}
