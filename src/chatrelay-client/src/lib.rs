//! Chatrelay Client - streaming and blocking chat calls against a chat
//! relay service.
//!
//! A [`ChatClient`] targets a prompt or agent (or, in the legacy API
//! generation, a portal or workflow) by id. Streaming calls deliver
//! incremental [`ChatResponse`] units over server-sent events until the
//! server marks the stream finished, the connection fails, or the caller
//! cancels. Blocking calls return the final unit directly.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatrelay_client::{CallbackHandler, ChatClient, ClientConfig};
//! use chatrelay_protocol::{ChatMessage, ChatRequest, Target};
//!
//! let client = ChatClient::new(ClientConfig::from_env()?)?;
//! let request = ChatRequest::new().with_message(ChatMessage::user("Hello"));
//! client.stream_chat(
//!     &Target::prompt("p1"),
//!     &request,
//!     Arc::new(CallbackHandler::new(
//!         |unit| print!("{}", unit.new_message.content),
//!         || println!(),
//!         |err| eprintln!("{err}"),
//!     )),
//! )?;
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod handler;
pub mod testing;
pub mod transport;

// Re-exports
pub use chatrelay_protocol::ChatResponse;
pub use client::ChatClient;
pub use config::ClientConfig;
pub use controller::{StreamController, StreamId};
pub use error::{ClientError, Result};
pub use handler::{
    CallbackHandler, ChannelHandler, ChatEventStream, ChatStreamHandler, StreamEvent,
    StreamOutcome, collect_stream,
};
pub use transport::{
    HttpRequest, HttpTransport, PushEventHandler, PushSubscription, Transport, TransportFailure,
};
