//! # Inference Relay
//!
//! The server half of the game. A capture arrives as JSON, gets a model profile
//! attached, goes out as a single chat-completions call, and comes back as a
//! normalized guess or a JSON error.
//!
//! ## Architecture
//!
//! - `types`: Wire types for the relay endpoint and for the inference API
//! - `inference`: The [`InferenceBackend`] seam and its DashScope implementation
//! - `handler`: [`Relay`], validation and response mapping, independent of HTTP
//! - `server`: The axum router and the serve loop

pub mod handler;
pub mod inference;
pub mod server;
pub mod types;

pub use handler::{Relay, UNRECOGNIZED_GUESS};
pub use inference::{DashScopeClient, InferenceBackend, extract_guess};
pub use server::{router, serve};
pub use types::{AnalyzeReply, AnalyzeRequest, ChatCompletionRequest, ErrorBody};
