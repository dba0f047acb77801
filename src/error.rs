//! # Relay Error Handling
//!
//! Every failure the relay can produce is a [`RelayError`]. Nothing escapes the
//! handler as a panic or a bare string: each variant knows which HTTP status it maps
//! to and which message is safe to show the caller.
//!
//! ## Error Classification
//!
//! | Variant | Status | Shown to caller |
//! |---------|--------|-----------------|
//! | `MissingInput` | 400 | what is missing |
//! | `BodyRejected` | status of the rejection | request body could not be read |
//! | `Configuration` | 500 | server is not configured |
//! | `Upstream` | upstream status | retry-later message (upstream body is never echoed) |
//! | `Timeout` | 504 | retry-later message |
//! | `Internal` | 500 | generic server error |
//!
//! `Upstream` and `Timeout` form the upstream failure class. The [`Retryable`] trait
//! reports which errors are worth trying again; the relay itself never retries.
//!
//! ## Usage
//!
//! ```rust
//! use sketch_guess::error::{RelayError, Retryable};
//!
//! let error = RelayError::upstream(429, "rate limited")
//!     .with_operation("chat_completions")
//!     .with_recovery_suggestion("Wait a moment before drawing again");
//!
//! assert_eq!(error.status_code(), 429);
//! assert!(error.is_retryable());
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, time::SystemTime};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::relay::types::ErrorBody;

/// Message returned when the request carries no image.
pub const MISSING_IMAGE_MESSAGE: &str = "No image data provided";
/// Message returned when the request body cannot be read at all.
pub const BODY_REJECTED_MESSAGE: &str = "Request body could not be read";
/// Message returned when the server has no API credential.
pub const CONFIGURATION_MESSAGE: &str = "API key is not configured";
/// Message returned for any upstream failure, including timeouts.
pub const UPSTREAM_MESSAGE: &str = "AI analysis failed, please try again later";
/// Message returned for every other failure.
pub const INTERNAL_MESSAGE: &str = "Server error, please try again later";

/// Metadata about when and where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Error type for the inference relay.
#[derive(Debug)]
pub enum RelayError {
    /// A required request field was absent or empty
    MissingInput { field: String, context: ErrorContext },
    /// The request body could not be read (too large, wrong encoding)
    BodyRejected {
        status: u16,
        reason: String,
        context: ErrorContext,
    },
    /// The server is missing a required setting
    Configuration {
        setting: String,
        reason: String,
        context: ErrorContext,
    },
    /// The inference API answered with a non-success status
    Upstream {
        status: u16,
        body: String,
        context: ErrorContext,
    },
    /// The inference API did not answer in time
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },
    /// Anything else: network failures, bad JSON, unexpected payloads
    Internal {
        operation: String,
        reason: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
}

impl RelayError {
    /// Create a missing-input error
    pub fn missing_input(field: impl Into<String>) -> Self {
        Self::MissingInput {
            field: field.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a body-rejected error
    pub fn body_rejected(status: u16, reason: impl Into<String>) -> Self {
        Self::BodyRejected {
            status,
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn configuration(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            setting: setting.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an upstream failure preserving the upstream status code
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
            context: ErrorContext::new(),
        }
    }

    /// Create an internal error from a message
    pub fn internal(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Internal {
            operation: operation.into(),
            reason: reason.into(),
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create an internal error wrapping a source error
    pub fn internal_from(
        operation: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            operation: operation.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::MissingInput { context, .. } => context,
            Self::BodyRejected { context, .. } => context,
            Self::Configuration { context, .. } => context,
            Self::Upstream { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::MissingInput { context, .. } => context,
            Self::BodyRejected { context, .. } => context,
            Self::Configuration { context, .. } => context,
            Self::Upstream { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Internal { context, .. } => context,
        }
    }

    /// What an operator can do about this error, if anything is known.
    pub fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "missing_input",
            Self::BodyRejected { .. } => "body_rejected",
            Self::Configuration { .. } => "configuration",
            Self::Upstream { .. } => "upstream",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal",
        }
    }

    /// HTTP status the relay answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingInput { .. } => 400,
            Self::BodyRejected { status, .. } => *status,
            Self::Configuration { .. } => 500,
            Self::Upstream { status, .. } => *status,
            Self::Timeout { .. } => 504,
            Self::Internal { .. } => 500,
        }
    }

    /// Message that is safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => MISSING_IMAGE_MESSAGE,
            Self::BodyRejected { .. } => BODY_REJECTED_MESSAGE,
            Self::Configuration { .. } => CONFIGURATION_MESSAGE,
            Self::Upstream { .. } | Self::Timeout { .. } => UPSTREAM_MESSAGE,
            Self::Internal { .. } => INTERNAL_MESSAGE,
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::MissingInput { field, .. } => {
                write!(f, "Missing required input '{}'", field)
            }
            RelayError::BodyRejected { status, reason, .. } => {
                write!(f, "Request body rejected ({}): {}", status, reason)
            }
            RelayError::Configuration {
                setting, reason, ..
            } => {
                write!(f, "Configuration error in '{}': {}", setting, reason)
            }
            RelayError::Upstream { status, body, .. } => {
                write!(f, "Inference API returned status {}: {}", status, body)
            }
            RelayError::Timeout {
                operation,
                duration_ms,
                ..
            } => {
                write!(f, "Timeout during {} after {}ms", operation, duration_ms)
            }
            RelayError::Internal {
                operation, reason, ..
            } => {
                write!(f, "Internal failure during {}: {}", operation, reason)
            }
        }
    }
}

impl StdError for RelayError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Internal {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias using the relay error type
pub type RelayResult<T> = Result<T, RelayError>;

/// Trait for errors that can be retried by the caller
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;
}

impl Retryable for RelayError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } => true,
            Self::Internal { source, .. } => source.is_some(),
            _ => false,
        }
    }
}
