//! Review submission body.

use serde::{Deserialize, Serialize};

/// Feedback on a completed exchange.
///
/// All four keys are always serialized; absent values are written as
/// JSON `null` rather than omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub chat_id: String,
    pub user_id: Option<String>,
    pub review_score: Option<i32>,
    pub review_text: Option<String>,
}

impl ReviewPayload {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id: None,
            review_score: None,
            review_text: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.review_score = Some(score);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.review_text = Some(text.into());
        self
    }
}
