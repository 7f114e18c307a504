//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `handlers` - Command execution handlers

pub mod args;
pub mod handlers;

// Re-export main types
pub use args::{ChatArgs, Cli, Commands, LogLevel, ReviewArgs};
pub use handlers::dispatch_command;
