//! Response units.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// One unit of incremental or final output.
///
/// Each server-sent event carries exactly one of these. Within a stream the
/// `chat_id` stays the same and only the last unit may set `stream_finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub new_message: ChatMessage,
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_finished: Option<bool>,
}

impl ChatResponse {
    /// Parse the data field of a push event.
    pub fn from_event_data(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Whether this unit carries the finish marker.
    pub fn is_finished(&self) -> bool {
        self.stream_finished.unwrap_or(false)
    }
}
