//! # Relay Configuration
//!
//! This module provides the configuration structure and validation for the relay
//! server. It is the common interface between the CLI (which fills it from flags
//! and environment variables) and the library (which only ever reads it).
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `api_key` | `Option<String>` | none | Bearer credential for the inference API |
//! | `base_url` | `String` | DashScope compatible-mode URL | Inference API root |
//! | `default_model` | `Option<String>` | none | Profile used when a request names none |
//! | `bind` | `SocketAddr` | `127.0.0.1:3000` | Listen address |
//! | `timeout` | `Duration` | 30s | Bound on the outbound inference call |
//! | `max_body_bytes` | `usize` | 8 MiB | Largest accepted request body |
//!
//! A missing `api_key` is not a validation error: the server still starts, and each
//! analyze request answers with a configuration error instead of calling out.
//!
//! ## Examples
//!
//! ```rust
//! use std::time::Duration;
//! use sketch_guess::config::RelayConfig;
//!
//! let config = RelayConfig::default()
//!     .with_api_key("sk-test")
//!     .with_timeout(Duration::from_secs(10));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.credential(), Some("sk-test"));
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Result, anyhow};

/// DashScope's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
/// Listen address used when none is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Outbound call bound used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Request body limit used when none is configured.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Configuration structure for the relay server.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Bearer credential for the inference API.
    ///
    /// Blank strings are treated as absent.
    pub api_key: Option<String>,

    /// Root of the OpenAI-compatible inference API, without the
    /// `/chat/completions` suffix. Trailing slashes are tolerated.
    pub base_url: String,

    /// Profile identifier used when a request names no model.
    ///
    /// Unknown identifiers are not rejected here; they fall back to the built-in
    /// default at resolution time.
    pub default_model: Option<String>,

    /// Socket address the HTTP server listens on.
    pub bind: SocketAddr,

    /// Bound on one outbound inference call. Must be greater than zero.
    pub timeout: Duration,

    /// Largest request body the relay accepts. Must be greater than zero.
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RelayConfig {
    /// Creates a new configuration with the specified parameters.
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        default_model: Option<String>,
        bind: SocketAddr,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            api_key,
            base_url,
            default_model,
            bind,
            timeout,
            max_body_bytes,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// The API credential, if one is available.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// The configured default profile identifier, ignoring blank values.
    pub fn default_model(&self) -> Option<&str> {
        self.default_model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }

    /// Full URL of the chat-completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Validates the configuration parameters.
    ///
    /// Time complexity: O(base_url.len()) for the scheme check.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "Base URL must start with http:// or https:// (got '{}')",
                self.base_url
            ));
        }
        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("Maximum body size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Parse duration string like "30", "30s", "2m" into a `Duration`.
pub fn parse_duration(duration: &str) -> Result<Duration> {
    let duration = duration.trim();
    if let Ok(seconds) = duration.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let len = duration.len();
    if len < 2 || !duration.is_char_boundary(len - 1) {
        return Err(anyhow!("Invalid duration format: {}", duration));
    }

    let (num_str, unit) = duration.split_at(len - 1);
    let num: u64 = num_str
        .parse()
        .map_err(|_| anyhow!("Invalid number in duration: {}", num_str))?;

    match unit {
        "s" => Ok(Duration::from_secs(num)),
        "m" => num
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| anyhow!("Duration too large: {}", duration)),
        _ => Err(anyhow!(
            "Invalid duration unit: {}. Use 's' for seconds, 'm' for minutes",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.credential(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RelayConfig::default();

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
        config.base_url = DEFAULT_BASE_URL.to_string();

        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.timeout = DEFAULT_TIMEOUT;

        config.max_body_bytes = 0;
        assert!(config.validate().is_err());
        config.max_body_bytes = DEFAULT_MAX_BODY_BYTES;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let config = RelayConfig::default()
            .with_api_key("   ")
            .with_default_model("");
        assert_eq!(config.credential(), None);
        assert_eq!(config.default_model(), None);

        let config = RelayConfig::default()
            .with_api_key(" sk-abc ")
            .with_default_model("qwen-vl-max");
        assert_eq!(config.credential(), Some("sk-abc"));
        assert_eq!(config.default_model(), Some("qwen-vl-max"));
    }

    #[test]
    fn test_chat_completions_url() {
        let config = RelayConfig::default().with_base_url("http://localhost:9000/v1/");
        assert_eq!(
            config.chat_completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(
            RelayConfig::default().chat_completions_url(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("1h").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("xs").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_minute_overflow() {
        assert!(parse_duration("307445734561825861m").is_err());
        let max_minutes = u64::MAX / 60;
        assert_eq!(
            parse_duration(&format!("{}m", max_minutes)).unwrap(),
            Duration::from_secs(max_minutes * 60)
        );
    }
}
