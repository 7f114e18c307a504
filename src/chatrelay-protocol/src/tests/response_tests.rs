//! Tests for response module.

use crate::message::{ChatMessage, Role};
use crate::response::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn ai_message() -> ChatMessage {
    ChatMessage::new(Role::Ai, "partial", "m1", "2024-01-01T00:00:00.000Z")
}

#[test]
fn test_parse_event_data_without_finish_marker() {
    let data = json!({
        "newMessage": {
            "content": "partial",
            "role": "AI",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "id": "m1"
        },
        "chatId": "c1"
    })
    .to_string();

    let response = ChatResponse::from_event_data(&data).unwrap();

    assert_eq!(response.chat_id, "c1");
    assert_eq!(response.new_message, ai_message());
    assert_eq!(response.stream_finished, None);
    assert!(!response.is_finished());
}

#[test]
fn test_finish_marker() {
    let mut response = ChatResponse {
        new_message: ai_message(),
        chat_id: "c1".to_string(),
        stream_finished: Some(false),
    };
    assert!(!response.is_finished());

    response.stream_finished = Some(true);
    assert!(response.is_finished());
}

#[test]
fn test_roundtrip_preserves_structure() {
    let response = ChatResponse {
        new_message: ai_message().with_usage(3, 4),
        chat_id: "c9".to_string(),
        stream_finished: Some(true),
    };

    let data = serde_json::to_string(&response).unwrap();
    assert_eq!(ChatResponse::from_event_data(&data).unwrap(), response);
}

#[test]
fn test_malformed_data_is_rejected() {
    assert!(ChatResponse::from_event_data("{not json").is_err());
    assert!(ChatResponse::from_event_data("{\"chatId\":\"c1\"}").is_err());
    assert!(ChatResponse::from_event_data("[]").is_err());
}
