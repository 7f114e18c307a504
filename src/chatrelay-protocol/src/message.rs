//! Conversation message types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Produced by the service.
    Ai,
    /// Produced by the caller.
    User,
}

/// One turn in a conversation.
///
/// Messages are immutable once built. The client only reads the history
/// it is given and hands back new AI messages for the caller to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub role: Role,
    /// ISO-8601 timestamp, kept verbatim as sent by the author.
    pub created_at: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Usage counters, only present on AI messages returned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl ChatMessage {
    /// Create a message with an explicit id and timestamp.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        id: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            role,
            created_at: created_at.into(),
            id: id.into(),
            provider_id: None,
            input_tokens: None,
            output_tokens: None,
        }
    }

    /// Create a user message stamped with a fresh id and the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(
            Role::User,
            content,
            Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    /// Set the provider identifier.
    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Attach usage counters.
    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }

    pub fn is_ai(&self) -> bool {
        self.role == Role::Ai
    }

    /// Parse `created_at`, returning `None` if it is not valid RFC 3339.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
