//! # Configuration Module
//!
//! Settings for the relay server: where the inference API lives, which credential
//! to present, which model profile to fall back to, and how long to wait.

pub mod config;

pub use config::{DEFAULT_BASE_URL, DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT, RelayConfig, parse_duration};
