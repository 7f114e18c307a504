//! Client configuration.
//!
//! Values are resolved in order of increasing precedence:
//! 1. Built-in defaults
//! 2. TOML file (`$CHATRELAY_HOME/config.toml`, default `~/.chatrelay/config.toml`)
//! 3. Environment variables (`CHATRELAY_BASE_URL`, `CHATRELAY_API_KEY`,
//!    `CHATRELAY_API_GENERATION`, `CHATRELAY_STREAM_IDLE_TIMEOUT_SECS`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chatrelay_common::{
    CHATRELAY_HOME_ENV, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, chatrelay_home, config_file_path,
};
use chatrelay_protocol::ApiGeneration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Service root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.chatrelay.dev";

/// Per-event deadline on a push subscription.
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_BASE_URL: &str = "CHATRELAY_BASE_URL";
pub const ENV_API_KEY: &str = "CHATRELAY_API_KEY";
pub const ENV_API_GENERATION: &str = "CHATRELAY_API_GENERATION";
pub const ENV_STREAM_IDLE_TIMEOUT: &str = "CHATRELAY_STREAM_IDLE_TIMEOUT_SECS";

/// Resolved client configuration.
pub struct ClientConfig {
    /// Service root; target URLs are `<base_url>/<kind>/<id>`.
    pub base_url: String,
    api_key: SecretString,
    /// Which naming generation of target kinds is accepted.
    pub generation: ApiGeneration,
    pub connect_timeout: Duration,
    /// Total timeout for request/response calls.
    pub request_timeout: Duration,
    /// Maximum silence between two events before a stream times out.
    pub stream_idle_timeout: Duration,
}

/// On-disk representation of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    api_key: Option<String>,
    generation: Option<ApiGeneration>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    stream_idle_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration with defaults and the given bearer token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            generation: ApiGeneration::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_TIMEOUT,
            stream_idle_timeout: DEFAULT_STREAM_IDLE_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_generation(mut self, generation: ApiGeneration) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// The bearer token. Callers must not log it.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Load from the default config file and the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading environment values through `lookup`.
    ///
    /// An explicit `path` must exist. Without one, the default file is read
    /// only if present.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => match default_config_path(&lookup) {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let api_key = non_empty(lookup(ENV_API_KEY))
            .or(file.api_key)
            .ok_or_else(|| {
                ClientError::config(format!(
                    "No API key configured. Set {ENV_API_KEY} or api_key in config.toml"
                ))
            })?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = non_empty(lookup(ENV_BASE_URL)).or(file.base_url) {
            config.base_url = base_url;
        }

        config.generation = match non_empty(lookup(ENV_API_GENERATION)) {
            Some(value) => ApiGeneration::from_str(&value).map_err(|_| {
                ClientError::config(format!(
                    "Invalid {ENV_API_GENERATION} '{value}': expected 'current' or 'legacy'"
                ))
            })?,
            None => file.generation.unwrap_or_default(),
        };

        if let Some(secs) = file.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.stream_idle_timeout_secs {
            config.stream_idle_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = non_empty(lookup(ENV_STREAM_IDLE_TIMEOUT)) {
            let secs: u64 = value.parse().map_err(|_| {
                ClientError::config(format!(
                    "Invalid {ENV_STREAM_IDLE_TIMEOUT} '{value}': expected seconds"
                ))
            })?;
            config.stream_idle_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        debug!(
            base_url = %config.base_url,
            generation = %config.generation,
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Check that the configuration can be used to build requests.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ClientError::config("API key is empty"));
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ClientError::config(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.stream_idle_timeout.is_zero() {
            return Err(ClientError::config("Stream idle timeout must be non-zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("generation", &self.generation)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .finish()
    }
}

fn default_config_path<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let home_override = lookup(CHATRELAY_HOME_ENV);
    chatrelay_home(home_override.as_deref()).map(|home| config_file_path(&home))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ClientError::config(format!("Failed to read {}: {e}", path.display()))
    })?;
    debug!(path = %path.display(), "Reading config file");
    toml::from_str(&content)
        .map_err(|e| ClientError::config(format!("Failed to parse {}: {e}", path.display())))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn empty_home() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_env_only_config() {
        let home = empty_home();
        let home_str = home.path().to_string_lossy().to_string();
        let config = ClientConfig::load(
            None,
            lookup_from(&[
                (CHATRELAY_HOME_ENV, home_str.as_str()),
                (ENV_API_KEY, "token-1"),
                (ENV_BASE_URL, "http://localhost:8080/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key(), "token-1");
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.generation, ApiGeneration::Current);
        assert_eq!(config.stream_idle_timeout, DEFAULT_STREAM_IDLE_TIMEOUT);
    }

    #[test]
    fn test_missing_api_key_is_error() {
        let home = empty_home();
        let home_str = home.path().to_string_lossy().to_string();
        let err = ClientConfig::load(None, lookup_from(&[(CHATRELAY_HOME_ENV, home_str.as_str())]))
            .unwrap_err();

        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn test_file_values_are_overridden_by_env() {
        let home = empty_home();
        std::fs::write(
            home.path().join("config.toml"),
            r#"
base_url = "https://file.example.com"
api_key = "file-key"
generation = "legacy"
stream_idle_timeout_secs = 5
"#,
        )
        .unwrap();
        let home_str = home.path().to_string_lossy().to_string();

        let config = ClientConfig::load(
            None,
            lookup_from(&[(CHATRELAY_HOME_ENV, home_str.as_str()), (ENV_API_KEY, "env-key")]),
        )
        .unwrap();

        assert_eq!(config.api_key(), "env-key");
        assert_eq!(config.base_url(), "https://file.example.com");
        assert_eq!(config.generation, ApiGeneration::Legacy);
        assert_eq!(config.stream_idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let home = empty_home();
        let missing = home.path().join("nope.toml");
        let err = ClientConfig::load(Some(&missing), lookup_from(&[(ENV_API_KEY, "k")]))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let home = empty_home();
        let path = home.path().join("custom.toml");
        std::fs::write(&path, "api_key = \"k\"\nretries = 3\n").unwrap();

        let err = ClientConfig::load(Some(&path), lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_invalid_generation_env() {
        let home = empty_home();
        let home_str = home.path().to_string_lossy().to_string();
        let err = ClientConfig::load(
            None,
            lookup_from(&[
                (CHATRELAY_HOME_ENV, home_str.as_str()),
                (ENV_API_KEY, "k"),
                (ENV_API_GENERATION, "v3"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains(ENV_API_GENERATION));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::new("k").with_base_url("ftp://example.com");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("k").with_base_url("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let config = ClientConfig::new("k").with_stream_idle_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("very-secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
