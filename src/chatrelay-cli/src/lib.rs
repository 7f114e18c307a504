//! Chatrelay CLI library.
//!
//! Argument definitions and command implementations for the `chatrelay`
//! binary, kept in a library so they can be unit tested.

pub mod chat_cmd;
pub mod cli;
pub mod review_cmd;
