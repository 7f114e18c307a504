//! Testing utilities.
//!
//! An in-memory [`Transport`] that records what it was asked to do and lets
//! a test drive push events by hand, plus a handler that records callbacks
//! into a shared, ordered log.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chatrelay_protocol::ChatResponse;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::handler::ChatStreamHandler;
use crate::transport::{
    HttpRequest, PushEventHandler, PushSubscription, Transport, TransportFailure,
};

/// One observed callback or subscription action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Response(ChatResponse),
    /// Error as displayed to the caller.
    Error(String),
    Close,
    /// `close()` was called on a subscription handle.
    SubscriptionClosed,
}

/// Shared, ordered record of [`Call`]s.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.lock().iter().filter(|c| *c == call).count()
    }
}

/// Stream handler that appends every callback to a [`CallLog`].
pub struct RecordingHandler {
    log: CallLog,
}

impl RecordingHandler {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl ChatStreamHandler for RecordingHandler {
    fn on_response(&self, response: ChatResponse) {
        self.log.push(Call::Response(response));
    }

    fn on_close(&self) {
        self.log.push(Call::Close);
    }

    fn on_error(&self, error: ClientError) {
        self.log.push(Call::Error(error.to_string()));
    }
}

/// A subscription opened through [`RecordingTransport`].
pub struct OpenedSubscription {
    request: HttpRequest,
    handler: Arc<dyn PushEventHandler>,
    closes: AtomicUsize,
    log: Option<CallLog>,
}

impl OpenedSubscription {
    /// The request the subscription was opened with.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn emit_data(&self, data: &str) {
        self.handler.on_data(data);
    }

    pub fn emit_error(&self, failure: TransportFailure) {
        self.handler.on_error(failure);
    }

    pub fn emit_closed(&self) {
        self.handler.on_closed();
    }

    /// How many times `close()` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl PushSubscription for OpenedSubscription {
    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.push(Call::SubscriptionClosed);
        }
    }

    fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

/// Transport that performs no I/O.
///
/// Push subscriptions are kept for the test to drive. Request/response calls
/// are recorded and answered from a queue, defaulting to `Null`.
#[derive(Default)]
pub struct RecordingTransport {
    log: Option<CallLog>,
    opened: Mutex<Vec<Arc<OpenedSubscription>>>,
    sent: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<Value>>>,
    fail_on_open: Option<TransportFailure>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record subscription closes into `log` alongside handler callbacks.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    /// Report `failure` synchronously from inside every open.
    pub fn fail_on_open(mut self, failure: TransportFailure) -> Self {
        self.fail_on_open = Some(failure);
        self
    }

    /// Queue the result of the next `send_request`.
    pub fn push_response(&self, response: Result<Value>) {
        self.responses.lock().push_back(response);
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn opened(&self, index: usize) -> Option<Arc<OpenedSubscription>> {
        self.opened.lock().get(index).cloned()
    }

    pub fn last_opened(&self) -> Option<Arc<OpenedSubscription>> {
        self.opened.lock().last().cloned()
    }

    pub fn sent_requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn open_push_subscription(
        &self,
        request: HttpRequest,
        handler: Arc<dyn PushEventHandler>,
    ) -> Arc<dyn PushSubscription> {
        let subscription = Arc::new(OpenedSubscription {
            request,
            handler: handler.clone(),
            closes: AtomicUsize::new(0),
            log: self.log.clone(),
        });
        self.opened.lock().push(subscription.clone());

        if let Some(failure) = &self.fail_on_open {
            handler.on_error(failure.clone());
        }
        subscription
    }

    async fn send_request(&self, request: HttpRequest) -> Result<Value> {
        self.sent.lock().push(request);
        self.responses.lock().pop_front().unwrap_or(Ok(Value::Null))
    }
}
