//! Error types for the Chatrelay client.

use chatrelay_protocol::{ApiGeneration, TargetKind};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for the client.
///
/// Streaming failures reach the caller through the stream handler's
/// `on_error`; blocking calls return them directly.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A request/response call returned a non-success status.
    #[error("Request failed: {method} {url} returned {status}")]
    RequestFailed {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// A push event could not be parsed as a chat response. The stream
    /// keeps running.
    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    /// Connection-level failure, timeout or protocol error on the push
    /// subscription. The stream is torn down.
    #[error("{0}")]
    Transport(String),

    #[error("Target kind '{kind}' is not available in the {generation} API generation")]
    UnsupportedTarget {
        kind: TargetKind,
        generation: ApiGeneration,
    },

    #[error("User secrets are not accepted by the {generation} API generation")]
    SecretsNotSupported { generation: ApiGeneration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// HTTP status carried by a `RequestFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error ends a stream when reported through `on_error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::MalformedEvent { .. })
    }
}
