//! Transport adapter.
//!
//! Two capabilities sit behind the [`Transport`] trait: a one-shot
//! request/response call and a server-push subscription. Both are
//! authenticated with a bearer token. The stream controller only ever talks
//! to this trait, so tests can substitute an in-memory implementation.

mod http;

pub use http::HttpTransport;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::error::Result;

/// Content type sent with every request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Accept header value for push subscriptions.
pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";

/// A fully-formed request: method, endpoint, JSON body and bearer token.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: serde_json::Value,
    auth_token: String,
}

impl HttpRequest {
    pub fn new(
        method: Method,
        url: impl Into<String>,
        body: serde_json::Value,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            body,
            auth_token: auth_token.into(),
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value, auth_token: &str) -> Self {
        Self::new(Method::POST, url, body, auth_token)
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Header name/value pairs for this request. The `Accept` header is
    /// only added for push subscriptions.
    pub fn headers(&self, event_stream: bool) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Content-Type", CONTENT_TYPE_JSON.to_string()),
            ("Authorization", format!("Bearer {}", self.auth_token)),
        ];
        if event_stream {
            headers.push(("Accept", ACCEPT_EVENT_STREAM.to_string()));
        }
        headers
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("auth_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Why a push subscription failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The server sent something that is not a valid event.
    Protocol(String),
    /// No data arrived within the transport's deadline.
    Timeout,
    /// Connection-level failure.
    Exception(String),
}

impl TransportFailure {
    /// Human-readable message reported to the caller.
    pub fn message(&self) -> String {
        match self {
            Self::Protocol(detail) | Self::Exception(detail) => format!("SSE error: {detail}"),
            Self::Timeout => "Timeout occurred".to_string(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Receiver of raw push-subscription events.
///
/// Implementations must tolerate being called from any thread and must not
/// assume reentrancy is excluded: `on_data` may close the subscription
/// while the transport is about to report it closed.
pub trait PushEventHandler: Send + Sync {
    /// One event's data field, possibly empty.
    fn on_data(&self, data: &str);
    fn on_error(&self, failure: TransportFailure);
    /// The server ended the stream cleanly.
    fn on_closed(&self);
}

/// Handle to an open push subscription.
pub trait PushSubscription: Send + Sync {
    /// Terminate the connection. Idempotent; no handler callbacks fire
    /// once this returns.
    fn close(&self);
    fn is_closed(&self) -> bool;
}

/// Request/response and push-subscription capabilities.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a push subscription and return its handle without waiting for
    /// the connection. Every outcome, including a failed connect, is
    /// reported through `handler`. Implementations may report events before
    /// this returns.
    fn open_push_subscription(
        &self,
        request: HttpRequest,
        handler: Arc<dyn PushEventHandler>,
    ) -> Arc<dyn PushSubscription>;

    /// Issue a single request and return the parsed JSON body (`Null` when
    /// the body is empty). Fails with `RequestFailed` on a non-2xx status.
    async fn send_request(&self, request: HttpRequest) -> Result<serde_json::Value>;
}
