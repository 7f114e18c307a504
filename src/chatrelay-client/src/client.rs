//! Chatrelay client implementation

use std::sync::Arc;

use chatrelay_protocol::{ChatRequest, ChatResponse, ReviewPayload, StreamMode, Target};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::controller::{StreamController, StreamId};
use crate::error::{ClientError, Result};
use crate::handler::{self, ChatEventStream, ChatStreamHandler};
use crate::transport::{HttpRequest, HttpTransport, Transport};

/// Path of the review endpoint under the service root.
const REVIEW_PATH: &str = "review";

/// Client for a chat relay service.
///
/// Holds one stream controller, so at most one stream is live per client.
/// Starting a new stream cancels the previous one.
pub struct ChatClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    controller: StreamController,
}

impl ChatClient {
    /// Create a client talking HTTP to the configured service.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an existing transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let controller = StreamController::new(transport.clone());
        Self {
            config,
            transport,
            controller,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint URL for a target, `<base_url>/<kind>/<id>`.
    pub fn target_url(&self, target: &Target) -> String {
        format!("{}/{}", self.config.base_url(), target.path())
    }

    fn build_request(
        &self,
        target: &Target,
        request: &ChatRequest,
        mode: StreamMode,
    ) -> Result<HttpRequest> {
        let generation = self.config.generation;
        if !generation.accepts(target.kind) {
            return Err(ClientError::UnsupportedTarget {
                kind: target.kind,
                generation,
            });
        }
        if request.user_secrets.is_some() && !generation.supports_user_secrets() {
            return Err(ClientError::SecretsNotSupported { generation });
        }

        let body = serde_json::to_value(request.to_payload(mode))?;
        Ok(HttpRequest::post(
            self.target_url(target),
            body,
            self.config.api_key(),
        ))
    }

    /// Start streaming a chat with `target`.
    ///
    /// Returns once the subscription has been requested. Units arrive
    /// through `handler`, which sees `on_close` exactly once unless the
    /// stream is cancelled.
    pub fn stream_chat(
        &self,
        target: &Target,
        request: &ChatRequest,
        handler: Arc<dyn ChatStreamHandler>,
    ) -> Result<StreamId> {
        let http_request = self.build_request(target, request, StreamMode::Streaming)?;
        let id = self.controller.start(http_request, handler);
        info!(
            stream_id = %id,
            kind = %target.kind,
            target_id = %target.id,
            messages = request.messages.len(),
            "Started chat stream"
        );
        Ok(id)
    }

    /// Start streaming a chat and receive its callbacks as a stream of
    /// events. The stream yields `Closed` last unless cancelled.
    pub fn stream_chat_events(
        &self,
        target: &Target,
        request: &ChatRequest,
    ) -> Result<ChatEventStream> {
        let (handler, events) = handler::channel();
        self.stream_chat(target, request, Arc::new(handler))?;
        Ok(events)
    }

    /// Request a complete, non-streamed response from `target`.
    pub async fn get_chat(&self, target: &Target, request: &ChatRequest) -> Result<ChatResponse> {
        let http_request = self.build_request(target, request, StreamMode::Blocking)?;
        debug!(kind = %target.kind, target_id = %target.id, "Requesting chat response");
        let body = self.transport.send_request(http_request).await?;
        serde_json::from_value(body).map_err(|e| {
            warn!(error = %e, "Unexpected chat response body");
            ClientError::Json(e)
        })
    }

    /// Submit feedback for a completed chat. The response body is ignored.
    pub async fn submit_review(&self, review: &ReviewPayload) -> Result<()> {
        let url = format!("{}/{REVIEW_PATH}", self.config.base_url());
        let body = serde_json::to_value(review)?;
        self.transport
            .send_request(HttpRequest::post(url, body, self.config.api_key()))
            .await?;
        info!(chat_id = %review.chat_id, "Review submitted");
        Ok(())
    }

    /// Cancel the active stream without firing any of its callbacks.
    /// Returns whether a stream was active.
    pub fn cancel_stream(&self) -> bool {
        let cancelled = self.controller.cancel();
        if cancelled {
            info!("Chat stream cancelled");
        }
        cancelled
    }

    pub fn is_streaming(&self) -> bool {
        self.controller.is_streaming()
    }

    pub fn active_stream(&self) -> Option<StreamId> {
        self.controller.active_stream()
    }
}
