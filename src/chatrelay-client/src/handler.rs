//! Caller-facing stream callbacks.
//!
//! A stream reports to a [`ChatStreamHandler`]. Two adapters are provided:
//! [`CallbackHandler`] for plain closures and [`channel`] for callers who
//! would rather consume a `futures::Stream` of [`StreamEvent`]s.

use chatrelay_protocol::ChatResponse;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use crate::error::ClientError;

/// Receives the outcome of one stream.
///
/// `on_close` fires at most once per stream and always last. Cancelling a
/// stream fires nothing.
pub trait ChatStreamHandler: Send + Sync {
    fn on_response(&self, response: ChatResponse);
    fn on_close(&self);
    fn on_error(&self, error: ClientError);
}

/// Handler built from three closures.
pub struct CallbackHandler<R, C, E> {
    on_response: R,
    on_close: C,
    on_error: E,
}

impl<R, C, E> CallbackHandler<R, C, E>
where
    R: Fn(ChatResponse) + Send + Sync,
    C: Fn() + Send + Sync,
    E: Fn(ClientError) + Send + Sync,
{
    pub fn new(on_response: R, on_close: C, on_error: E) -> Self {
        Self {
            on_response,
            on_close,
            on_error,
        }
    }
}

impl<R, C, E> ChatStreamHandler for CallbackHandler<R, C, E>
where
    R: Fn(ChatResponse) + Send + Sync,
    C: Fn() + Send + Sync,
    E: Fn(ClientError) + Send + Sync,
{
    fn on_response(&self, response: ChatResponse) {
        (self.on_response)(response)
    }

    fn on_close(&self) {
        (self.on_close)()
    }

    fn on_error(&self, error: ClientError) {
        (self.on_error)(error)
    }
}

/// Stream callbacks as values.
#[derive(Debug)]
pub enum StreamEvent {
    Response(ChatResponse),
    Error(ClientError),
    Closed,
}

/// Handler forwarding every callback into an unbounded channel.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelHandler {
    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            trace!("Stream event receiver dropped");
        }
    }
}

impl ChatStreamHandler for ChannelHandler {
    fn on_response(&self, response: ChatResponse) {
        self.send(StreamEvent::Response(response));
    }

    fn on_close(&self) {
        self.send(StreamEvent::Closed);
    }

    fn on_error(&self, error: ClientError) {
        self.send(StreamEvent::Error(error));
    }
}

/// Stream of events produced by a [`ChannelHandler`].
pub type ChatEventStream = UnboundedReceiverStream<StreamEvent>;

/// Create a connected handler/stream pair.
pub fn channel() -> (ChannelHandler, ChatEventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHandler { tx }, UnboundedReceiverStream::new(rx))
}

/// Everything a stream produced, folded together.
#[derive(Debug, Default)]
pub struct StreamOutcome {
    pub chat_id: Option<String>,
    /// Content of every unit, concatenated in arrival order.
    pub content: String,
    pub responses: Vec<ChatResponse>,
    pub errors: Vec<ClientError>,
    /// Whether a unit carried the finish marker.
    pub finished: bool,
    /// Whether the stream reported `Closed`.
    pub closed: bool,
}

impl StreamOutcome {
    /// The last unit received, normally the one with the finish marker.
    pub fn last_response(&self) -> Option<&ChatResponse> {
        self.responses.last()
    }
}

/// Consume events until `Closed` (or the stream ends) and fold them.
pub async fn collect_stream<S>(mut events: S) -> StreamOutcome
where
    S: Stream<Item = StreamEvent> + Unpin,
{
    let mut outcome = StreamOutcome::default();
    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Response(response) => {
                if outcome.chat_id.is_none() {
                    outcome.chat_id = Some(response.chat_id.clone());
                }
                outcome.content.push_str(&response.new_message.content);
                outcome.finished |= response.is_finished();
                outcome.responses.push(response);
            }
            StreamEvent::Error(error) => outcome.errors.push(error),
            StreamEvent::Closed => {
                outcome.closed = true;
                break;
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_protocol::{ChatMessage, Role};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unit(content: &str, finished: Option<bool>) -> ChatResponse {
        ChatResponse {
            new_message: ChatMessage::new(Role::Ai, content, "m1", "2024-01-01T00:00:00Z"),
            chat_id: "c1".to_string(),
            stream_finished: finished,
        }
    }

    #[test]
    fn test_callback_handler_dispatches() {
        let responses = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let handler = {
            let (r, c, e) = (responses.clone(), closes.clone(), errors.clone());
            CallbackHandler::new(
                move |_| {
                    r.fetch_add(1, Ordering::SeqCst);
                },
                move || {
                    c.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    e.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        handler.on_response(unit("a", None));
        handler.on_error(ClientError::malformed_event("x"));
        handler.on_close();

        assert_eq!(responses.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_collect_stream_folds_until_closed() {
        let (handler, events) = channel();
        handler.on_response(unit("Hel", None));
        handler.on_error(ClientError::malformed_event("bad"));
        handler.on_response(unit("lo", Some(true)));
        handler.on_close();
        handler.on_response(unit("ignored", None));

        let outcome = collect_stream(events).await;

        assert_eq!(outcome.chat_id.as_deref(), Some("c1"));
        assert_eq!(outcome.content, "Hello");
        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.finished);
        assert!(outcome.closed);
        assert_eq!(
            outcome.last_response().map(|r| r.new_message.content.as_str()),
            Some("lo")
        );
    }

    #[tokio::test]
    async fn test_collect_stream_ends_when_sender_dropped() {
        let (handler, events) = channel();
        handler.on_response(unit("partial", None));
        drop(handler);

        let outcome = collect_stream(events).await;

        assert_eq!(outcome.content, "partial");
        assert!(!outcome.closed);
        assert!(!outcome.finished);
    }
}
