//! Chatrelay Protocol - wire types shared by the client and its callers
//!
//! This crate defines the JSON shapes exchanged with the chat service:
//! conversation messages, streamed or final response units, the request
//! body sent to a prompt/agent (or legacy portal/workflow) target, and the
//! review submission body.

pub mod message;
pub mod request;
pub mod response;
pub mod review;
pub mod target;
pub mod variables;

#[cfg(test)]
mod tests;

// Re-exports
pub use message::{ChatMessage, Role};
pub use request::{ChatRequest, RequestPayload, StreamMode};
pub use response::ChatResponse;
pub use review::ReviewPayload;
pub use target::{ApiGeneration, Target, TargetKind};
pub use variables::{FilledVariables, UserSecrets};
