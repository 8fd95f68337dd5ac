//! Error types for the chat panel and its collaborators.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by panel operations and the AI action.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The draft was empty or whitespace-only.
    #[error("Draft is empty")]
    EmptyDraft,

    /// The AI action rejected the submission.
    #[error("Action rejected: {0}")]
    Rejected(String),

    /// The AI action resolved without a usable entry.
    #[error("Malformed reply: {0}")]
    Malformed(String),

    /// The AI action did not resolve in time.
    #[error("Action timed out")]
    Timeout,

    /// HTTP transport failure talking to the model endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body returned by the endpoint.
        message: String,
    },

    /// No panel is registered under the given session id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl ChatError {
    /// Whether this error came from the AI action rather than the caller.
    #[must_use]
    pub fn is_action_failure(&self) -> bool {
        !matches!(self, Self::EmptyDraft | Self::SessionNotFound(_))
    }

    /// HTTP status used when the error escapes a handler.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyDraft => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Rejected(_) | Self::Malformed(_) | Self::Http(_) | Self::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Result alias for panel operations.
pub type Result<T> = std::result::Result<T, ChatError>;
