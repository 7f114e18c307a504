//! Stream controller.
//!
//! Owns at most one live push subscription. The controller is either
//! `Idle` or `Streaming`; transitions happen only through the three
//! transport events (data, error, closed) and the two caller actions
//! (start, cancel). Every way a stream can end funnels through a single
//! `terminate` step, so the subscription is released and `on_close` fires
//! at most once, whichever path gets there first.
//!
//! Starting a stream while another is live cancels the old one silently
//! before the new subscription becomes active.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chatrelay_protocol::ChatResponse;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::error::ClientError;
use crate::handler::ChatStreamHandler;
use crate::transport::{
    HttpRequest, PushEventHandler, PushSubscription, Transport, TransportFailure,
};

/// Identifier of one stream within a controller, for logs and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

#[derive(Default)]
enum StreamState {
    #[default]
    Idle,
    Streaming(Arc<StreamSession>),
}

/// Drives one push subscription at a time on behalf of a caller.
pub struct StreamController {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<StreamState>>,
    next_id: AtomicU64,
}

impl StreamController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(StreamState::Idle)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Open a subscription for `request` and route its events to `handler`.
    ///
    /// Returns as soon as the subscription has been requested; responses
    /// arrive through the handler.
    pub fn start(&self, request: HttpRequest, handler: Arc<dyn ChatStreamHandler>) -> StreamId {
        let id = StreamId(self.next_id.fetch_add(1, Ordering::Relaxed));

        if self.cancel() {
            info!(stream_id = %id, "Replacing active stream");
        }

        debug!(stream_id = %id, url = %request.url, "Opening push subscription");
        let session = Arc::new(StreamSession {
            id,
            handler,
            subscription: Mutex::new(Slot::Opening),
            terminated: AtomicBool::new(false),
            owner: Arc::downgrade(&self.state),
        });
        let subscription = self
            .transport
            .open_push_subscription(request, session.clone());
        session.attach(subscription);

        let displaced = {
            let mut state = self.state.lock();
            if session.is_terminated() {
                // Ended during open; nothing to track.
                None
            } else {
                match mem::replace(&mut *state, StreamState::Streaming(session)) {
                    StreamState::Streaming(previous) => Some(previous),
                    StreamState::Idle => None,
                }
            }
        };
        if let Some(previous) = displaced {
            warn!(stream_id = %previous.id, "Cancelling stream started concurrently");
            previous.cancel();
        }

        id
    }

    /// Close the active subscription, if any, without firing callbacks.
    ///
    /// Returns whether a stream was active.
    pub fn cancel(&self) -> bool {
        let previous = mem::take(&mut *self.state.lock());
        match previous {
            StreamState::Streaming(session) => {
                session.cancel();
                true
            }
            StreamState::Idle => false,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(&*self.state.lock(), StreamState::Streaming(_))
    }

    pub fn active_stream(&self) -> Option<StreamId> {
        match &*self.state.lock() {
            StreamState::Streaming(session) => Some(session.id),
            StreamState::Idle => None,
        }
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Where a session's subscription handle is in its life.
enum Slot {
    /// `open_push_subscription` has not returned yet.
    Opening,
    /// The stream ended while opening. `attach` closes the handle, then
    /// fires `on_close` if `notify_close` is set.
    ClosePending { notify_close: bool },
    Attached(Arc<dyn PushSubscription>),
    Released,
}

/// Per-stream state shared with the transport as its event handler.
struct StreamSession {
    id: StreamId,
    handler: Arc<dyn ChatStreamHandler>,
    subscription: Mutex<Slot>,
    terminated: AtomicBool,
    owner: Weak<Mutex<StreamState>>,
}

impl StreamSession {
    /// Store the handle returned by the transport. If the stream already
    /// ended while opening, close the handle and deliver the deferred
    /// `on_close`.
    fn attach(&self, subscription: Arc<dyn PushSubscription>) {
        let mut slot = self.subscription.lock();
        match mem::replace(&mut *slot, Slot::Released) {
            Slot::Opening => *slot = Slot::Attached(subscription),
            Slot::ClosePending { notify_close } => {
                drop(slot);
                subscription.close();
                if notify_close {
                    debug!(stream_id = %self.id, "Stream ended while opening");
                    self.handler.on_close();
                }
            }
            // Closed by the transport while opening; nothing left to close.
            Slot::Attached(_) | Slot::Released => {}
        }
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Claim the single terminal transition. Only the first caller wins.
    fn terminate(&self) -> bool {
        !self.terminated.swap(true, Ordering::SeqCst)
    }

    /// Close the handle. Returns `false` when the handle has not been
    /// attached yet; `attach` then closes it and fires `on_close` if
    /// `notify_close` is set.
    fn close_subscription(&self, notify_close: bool) -> bool {
        let mut slot = self.subscription.lock();
        match mem::replace(&mut *slot, Slot::Released) {
            Slot::Attached(subscription) => {
                drop(slot);
                subscription.close();
                true
            }
            Slot::Opening => {
                *slot = Slot::ClosePending { notify_close };
                false
            }
            Slot::ClosePending { .. } | Slot::Released => true,
        }
    }

    /// Close, return to `Idle`, then fire `on_close` once the handle is
    /// closed.
    fn finish(&self) {
        let closed = self.close_subscription(true);
        self.release();
        if closed {
            self.handler.on_close();
        }
    }

    /// Return the controller to `Idle` unless a newer stream replaced us.
    fn release(&self) {
        let Some(state) = self.owner.upgrade() else {
            return;
        };
        let mut state = state.lock();
        if matches!(&*state, StreamState::Streaming(current) if current.id == self.id) {
            *state = StreamState::Idle;
        }
    }

    fn cancel(&self) {
        if self.terminate() {
            self.close_subscription(false);
            self.release();
            debug!(stream_id = %self.id, "Stream cancelled");
        }
    }
}

impl PushEventHandler for StreamSession {
    fn on_data(&self, data: &str) {
        if self.is_terminated() {
            trace!(stream_id = %self.id, "Dropping event for finished stream");
            return;
        }
        if data.trim().is_empty() {
            debug!(stream_id = %self.id, "Ignoring empty event");
            return;
        }

        let response = match ChatResponse::from_event_data(data) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    stream_id = %self.id,
                    error = %e,
                    len = data.len(),
                    "Malformed stream event"
                );
                self.handler.on_error(ClientError::malformed_event(format!(
                    "failed to parse chat response: {e}"
                )));
                return;
            }
        };

        let finished = response.is_finished();
        trace!(
            stream_id = %self.id,
            chat_id = %response.chat_id,
            finished,
            "Stream unit received"
        );
        self.handler.on_response(response);

        if finished && self.terminate() {
            info!(stream_id = %self.id, "Stream finished");
            self.finish();
        }
    }

    fn on_error(&self, failure: TransportFailure) {
        if !self.terminate() {
            return;
        }
        error!(stream_id = %self.id, error = %failure, "Stream transport error");
        self.handler.on_error(ClientError::Transport(failure.message()));
        self.finish();
    }

    fn on_closed(&self) {
        if !self.terminate() {
            return;
        }
        // Closed by the transport; drop the handle without closing it again.
        *self.subscription.lock() = Slot::Released;
        self.release();
        debug!(stream_id = %self.id, "Stream closed by server");
        self.handler.on_close();
    }
}
