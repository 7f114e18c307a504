//! Chat request body.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::variables::{FilledVariables, UserSecrets};

/// Value of the `stream` field. The service expects the strings
/// `"true"` and `"false"`, not JSON booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamMode {
    #[serde(rename = "true")]
    Streaming,
    #[serde(rename = "false")]
    Blocking,
}

/// Everything a caller supplies for one chat call, independent of target
/// and transport mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub user_id: Option<String>,
    pub variables: FilledVariables,
    /// Ordered conversation history sent as context.
    pub messages: Vec<ChatMessage>,
    pub user_secrets: Option<UserSecrets>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn with_variables(mut self, variables: FilledVariables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_user_secrets(mut self, secrets: UserSecrets) -> Self {
        self.user_secrets = Some(secrets);
        self
    }

    /// Borrow this request as a wire payload.
    pub fn to_payload(&self, stream: StreamMode) -> RequestPayload<'_> {
        RequestPayload {
            variables: &self.variables,
            messages: &self.messages,
            stream,
            user_id: self.user_id.as_deref(),
            user_secrets: self.user_secrets.as_ref(),
        }
    }
}

/// POST body for streaming and non-streaming chat calls.
///
/// `userId` and `userSecrets` are omitted from the JSON when absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload<'a> {
    pub variables: &'a FilledVariables,
    pub messages: &'a [ChatMessage],
    pub stream: StreamMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_secrets: Option<&'a UserSecrets>,
}
