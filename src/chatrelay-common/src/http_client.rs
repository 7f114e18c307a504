//! Shared reqwest client construction.
//!
//! Request/response calls and event streams need different deadlines: a
//! review POST should fail fast, while a chat stream stays open for as long
//! as the server keeps generating. [`ClientTimeouts`] captures the deadlines
//! and [`build_client`] applies them together with the settings every
//! client shares (user agent, Nagle disabled, small idle pool).

use std::time::Duration;

use reqwest::Client;

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("chatrelay/", env!("CARGO_PKG_VERSION"));

/// Request/response deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled connections idle longer than this are dropped.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

const POOL_MAX_IDLE_PER_HOST: usize = 4;

/// Connect and total deadlines for one client. `total: None` leaves whole
/// requests unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub total: Option<Duration>,
}

impl ClientTimeouts {
    pub const fn new(connect: Duration, total: Duration) -> Self {
        Self {
            connect,
            total: Some(total),
        }
    }

    /// Same connect deadline, no total deadline. A healthy stream may run
    /// for any length of time; silence between events is bounded by the
    /// transport's idle timeout instead.
    pub fn for_streaming(self) -> Self {
        Self {
            connect: self.connect,
            total: None,
        }
    }
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT)
    }
}

/// Build a client with the given deadlines.
pub fn build_client(timeouts: ClientTimeouts) -> Result<Client, String> {
    let builder = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeouts.connect);
    let builder = match timeouts.total {
        Some(total) => builder.timeout(total),
        None => builder,
    };
    builder
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}
