//! HTTP transport built on reqwest and eventsource-stream.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatrelay_common::{ClientTimeouts, build_client};
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::{HttpRequest, PushEventHandler, PushSubscription, Transport, TransportFailure};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Longest response body excerpt carried in an error message.
const BODY_PREVIEW_LEN: usize = 200;

/// Transport backed by two reqwest clients: one tuned for request/response
/// calls and one for long-lived event streams.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    streaming_client: Client,
    idle_timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        connect_timeout: Duration,
        request_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self> {
        let timeouts = ClientTimeouts::new(connect_timeout, request_timeout);
        let client = build_client(timeouts).map_err(ClientError::Config)?;
        let streaming_client =
            build_client(timeouts.for_streaming()).map_err(ClientError::Config)?;
        Ok(Self {
            client,
            streaming_client,
            idle_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.connect_timeout,
            config.request_timeout,
            config.stream_idle_timeout,
        )
    }

    fn prepare(client: &Client, request: &HttpRequest, event_stream: bool) -> RequestBuilder {
        request
            .headers(event_stream)
            .into_iter()
            .fold(
                client.request(request.method.clone(), &request.url),
                |builder, (name, value)| builder.header(name, value),
            )
            .json(&request.body)
    }
}

/// Subscription handle; closing cancels the pump task.
struct HttpSubscription {
    token: CancellationToken,
}

impl PushSubscription for HttpSubscription {
    fn close(&self) {
        if !self.token.is_cancelled() {
            trace!("Closing push subscription");
            self.token.cancel();
        }
    }

    fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn open_push_subscription(
        &self,
        request: HttpRequest,
        handler: Arc<dyn PushEventHandler>,
    ) -> Arc<dyn PushSubscription> {
        let token = CancellationToken::new();
        let subscription = Arc::new(HttpSubscription {
            token: token.clone(),
        });
        let builder = Self::prepare(&self.streaming_client, &request, true);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(pump_events(
                    builder,
                    request.url,
                    handler,
                    token,
                    self.idle_timeout,
                ));
            }
            Err(e) => {
                error!(url = %request.url, "Cannot open push subscription outside a tokio runtime");
                handler.on_error(TransportFailure::Exception(format!(
                    "no async runtime available: {e}"
                )));
            }
        }

        subscription
    }

    async fn send_request(&self, request: HttpRequest) -> Result<serde_json::Value> {
        let method = request.method.clone();
        let url = request.url.clone();

        debug!(method = %method, url = %url, "Sending request");
        let resp = Self::prepare(&self.client, &request, false)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Request failed");
                ClientError::Network(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, method = %method, url = %url, "Request returned error status");
            return Err(ClientError::RequestFailed {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Drive one subscription until it ends, fails or is cancelled.
async fn pump_events(
    builder: RequestBuilder,
    url: String,
    handler: Arc<dyn PushEventHandler>,
    token: CancellationToken,
    idle_timeout: Duration,
) {
    let sent = tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!(url = %url, "Push subscription cancelled before connect");
            return;
        }
        sent = builder.send() => sent,
    };

    let resp = match sent {
        Ok(resp) => resp,
        Err(e) => {
            if !token.is_cancelled() {
                handler.on_error(classify_reqwest_error(&e));
            }
            return;
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, url = %url, "Push subscription rejected");
        if !token.is_cancelled() {
            handler.on_error(TransportFailure::Exception(format!(
                "HTTP {status} from {url}: {}",
                preview(&body)
            )));
        }
        return;
    }

    debug!(url = %url, "Push subscription connected");
    let mut stream = std::pin::pin!(resp.bytes_stream().eventsource());

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(url = %url, "Push subscription cancelled");
                return;
            }
            next = timeout(idle_timeout, stream.next()) => next,
        };

        match next {
            Ok(Some(Ok(event))) => {
                trace!(len = event.data.len(), event = %event.event, "Push event received");
                handler.on_data(&event.data);
            }
            Ok(Some(Err(e))) => {
                handler.on_error(classify_stream_error(e));
                return;
            }
            Ok(None) => {
                debug!(url = %url, "Push subscription ended by server");
                handler.on_closed();
                return;
            }
            Err(_) => {
                warn!(
                    url = %url,
                    timeout_secs = idle_timeout.as_secs(),
                    "Push subscription idle timeout"
                );
                handler.on_error(TransportFailure::Timeout);
                return;
            }
        }

        if token.is_cancelled() {
            return;
        }
    }
}

fn classify_stream_error(err: EventStreamError<reqwest::Error>) -> TransportFailure {
    match err {
        EventStreamError::Utf8(e) => TransportFailure::Protocol(format!("invalid UTF-8: {e}")),
        EventStreamError::Parser(e) => TransportFailure::Protocol(format!("invalid event: {e}")),
        EventStreamError::Transport(e) => classify_reqwest_error(&e),
    }
}

fn classify_reqwest_error(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Exception(err.to_string())
    }
}

fn preview(body: &str) -> String {
    if body.len() > BODY_PREVIEW_LEN {
        let cut = (0..=BODY_PREVIEW_LEN)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        let short = preview(&body);
        assert_eq!(short.len(), BODY_PREVIEW_LEN + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let short = preview(&body);
        assert!(short.ends_with("..."));
        assert!(short.len() <= BODY_PREVIEW_LEN + 3);
    }

    #[test]
    fn test_preview_keeps_short_bodies() {
        assert_eq!(preview("oops"), "oops");
    }

    #[test]
    fn test_subscription_close_is_idempotent() {
        let subscription = HttpSubscription {
            token: CancellationToken::new(),
        };
        assert!(!subscription.is_closed());
        subscription.close();
        subscription.close();
        assert!(subscription.is_closed());
    }
}
