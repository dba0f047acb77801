//! # Sketch Guess
//!
//! A drawing game backend: a user sketches on a canvas, the sketch is sent to a
//! cloud vision-language model, and the model's guess comes back for display along
//! with a short history of earlier guesses.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `relay`: The `POST /analyze-drawing` relay to the inference API
//! - `profiles`: Built-in model profiles and fallback resolution
//! - `board`: Client-side session state and the HTTP client for the relay
//! - `config`: Relay configuration and validation
//! - `error`: The relay error taxonomy and its HTTP mapping
//!
//! Drawing itself lives in the `sketch-canvas` workspace crate, re-exported here
//! as [`canvas`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sketch_guess::config::RelayConfig;
//! use sketch_guess::relay::{DashScopeClient, Relay, AnalyzeRequest};
//! use sketch_guess::canvas::{Canvas, Point};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut canvas = Canvas::default();
//! canvas.begin(Point::new(100.0, 250.0));
//! canvas.extend(Point::new(400.0, 250.0));
//! canvas.end();
//!
//! let config = RelayConfig::default().with_api_key("sk-...");
//! let backend = DashScopeClient::new(&config)?;
//! let relay = Relay::new(Arc::new(config), Arc::new(backend));
//!
//! let reply = relay.analyze(AnalyzeRequest::new(canvas.export()?, None)).await?;
//! println!("{} ({})", reply.guess, reply.model);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use tracing::info;

pub mod board;
pub mod config;
pub mod error;
pub mod profiles;
pub mod relay;

/// Re-export the drawing crate
pub use sketch_canvas as canvas;

/// Re-export error types for convenience
pub use error::{RelayError, RelayResult, Retryable};

pub use config::RelayConfig;

/// Main entry point for running the relay server.
///
/// Validates `config`, logs the effective settings, and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the listen address cannot be
/// bound, or the server stops abnormally. Individual request failures never end up
/// here; they are answered as JSON errors.
///
/// # Examples
///
/// ```rust,no_run
/// use sketch_guess::{RelayConfig, run_relay};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = RelayConfig::default().with_api_key("sk-...");
///     run_relay(config).await
/// }
/// ```
pub async fn run_relay(config: RelayConfig) -> Result<()> {
    info!(
        base_url = %config.base_url,
        default_model = config.default_model().unwrap_or(profiles::DEFAULT_PROFILE),
        max_body_bytes = config.max_body_bytes,
        "Starting relay"
    );
    relay::serve(config).await
}
