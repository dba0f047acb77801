//! # Relay Server
//!
//! HTTP surface of the relay:
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/analyze-drawing` | POST | Forward a capture, answer with a guess |
//! | `/api/analyze-drawing` | POST | Same handler under the `/api` prefix browsers call |
//! | `/models` | GET | Model catalogue for the client's model picker |
//!
//! The analyze handler reads the raw body and parses it itself, so a malformed or
//! oversized body still gets a JSON `{error}` answer instead of axum's plain-text
//! rejection.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tracing::{error, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::profiles::{self, ModelCatalogue};
use crate::relay::handler::Relay;
use crate::relay::inference::DashScopeClient;
use crate::relay::types::AnalyzeRequest;

/// Builds the router around an existing relay.
pub fn router(relay: Arc<Relay>) -> Router {
    let max_body = relay.config().max_body_bytes;
    Router::new()
        .route("/analyze-drawing", post(analyze_drawing))
        .route("/api/analyze-drawing", post(analyze_drawing))
        .route("/models", get(list_models))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(relay)
}

async fn analyze_drawing(
    State(relay): State<Arc<Relay>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let outcome = async {
        let body = body.map_err(|rejection| {
            RelayError::body_rejected(rejection.status().as_u16(), rejection.body_text())
        })?;
        let request: AnalyzeRequest = serde_json::from_slice(&body).map_err(|e| {
            RelayError::internal_from("parse_request", e).with_context("reading analyze-drawing body")
        })?;
        relay.analyze(request).await
    }
    .await;

    match outcome {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            let recovery = e.recovery_suggestion().unwrap_or_default();
            if e.status_code() >= 500 {
                error!(category = e.category(), error = %e, recovery, "Analyze request failed");
            } else {
                warn!(category = e.category(), error = %e, recovery, "Analyze request rejected");
            }
            e.into_response()
        }
    }
}

async fn list_models(State(relay): State<Arc<Relay>>) -> Json<ModelCatalogue> {
    Json(profiles::catalogue(relay.config().default_model()))
}

/// Binds `config.bind` and serves until Ctrl-C.
pub async fn serve(config: RelayConfig) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    if config.credential().is_none() {
        warn!("No API credential configured; analyze requests will fail until DASHSCOPE_API_KEY is set");
    }
    if let Some(model) = config.default_model() {
        if profiles::lookup(model).is_none() {
            warn!(model, fallback = profiles::DEFAULT_PROFILE, "Configured default model is unknown");
        }
    }

    let backend = DashScopeClient::new(&config)?;
    let bind = config.bind;
    let timeout_ms = config.timeout.as_millis() as u64;
    let relay = Arc::new(Relay::new(Arc::new(config), Arc::new(backend)));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!(address = %listener.local_addr()?, timeout_ms, "Relay listening");

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving relay")?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A signal that cannot be listened for never
/// resolves, so the server keeps running instead of stopping right away.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!(error = %e, "Failed to listen for shutdown signal; serving until killed");
        std::future::pending::<()>().await;
    }
}
