//! Common utilities shared across Chatrelay crates.

pub mod dirs;
pub mod http_client;

pub use dirs::{CHATRELAY_HOME_ENV, CONFIG_FILE, HOME_DIR_NAME, chatrelay_home, config_file_path};
pub use http_client::{
    ClientTimeouts, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, USER_AGENT, build_client,
};
