// HTTP client for the relay, plus the glue that feeds its answers into a GuessBoard.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use crate::board::guess_board::GuessBoard;
use crate::relay::types::{AnalyzeReply, AnalyzeRequest, ErrorBody};

/// Shown when the relay answered with an error but no readable message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Analysis failed";
/// Shown when the relay could not be reached at all.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Analysis failed, please try again";

#[derive(Debug)]
pub enum ClientError {
    /// The relay answered with a non-success status
    Rejected { status: u16, message: String },
    /// The relay could not be reached or its answer could not be read
    Transport(reqwest::Error),
}

impl ClientError {
    /// Message to put in front of the user.
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Rejected { message, .. } => message,
            ClientError::Transport(_) => TRANSPORT_ERROR_MESSAGE,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Rejected { status, message } => {
                write!(f, "Relay rejected the request ({}): {}", status, message)
            }
            ClientError::Transport(e) => write!(f, "Relay unreachable: {}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Talks to a running relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// `base_url` is the relay root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Sends one capture for analysis.
    pub async fn analyze(
        &self,
        image_data: &str,
        model_name: Option<&str>,
    ) -> Result<AnalyzeReply, ClientError> {
        let request = AnalyzeRequest::new(image_data, model_name.map(str::to_string));
        let response = self
            .http
            .post(format!("{}/analyze-drawing", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<AnalyzeReply>().await?)
    }

    /// Fetches the relay's model catalogue as raw JSON.
    pub async fn models(&self) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Runs one analysis against `board`: begin, request, apply.
    ///
    /// The board lock is not held while the request is in flight, so several
    /// submissions can overlap; each applies its outcome when it resolves.
    pub async fn submit(
        &self,
        board: &Mutex<GuessBoard>,
        image_data: &str,
    ) -> Result<AnalyzeReply, ClientError> {
        let (ticket, model) = {
            let mut board = board.lock().await;
            let model = board.selected_model().to_string();
            (board.begin_analysis(), model)
        };

        let outcome = self.analyze(image_data, Some(&model)).await;

        let mut board = board.lock().await;
        match &outcome {
            Ok(reply) => board.apply_success(ticket, reply),
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                board.apply_failure(ticket, e.user_message());
            }
        }
        outcome
    }
}
