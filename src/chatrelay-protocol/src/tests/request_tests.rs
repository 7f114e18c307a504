//! Tests for request module.

use crate::message::{ChatMessage, Role};
use crate::request::*;
use crate::variables::UserSecrets;
use pretty_assertions::assert_eq;
use serde_json::json;

fn msg1() -> ChatMessage {
    ChatMessage::new(Role::User, "hello", "m1", "2024-01-01T00:00:00.000Z")
}

#[test]
fn test_streaming_payload_omits_absent_user_id() {
    let request = ChatRequest::new()
        .with_variable("k", "v")
        .with_message(msg1());

    let value = serde_json::to_value(request.to_payload(StreamMode::Streaming)).unwrap();

    assert_eq!(
        value,
        json!({
            "variables": {"k": "v"},
            "messages": [{
                "content": "hello",
                "role": "USER",
                "createdAt": "2024-01-01T00:00:00.000Z",
                "id": "m1"
            }],
            "stream": "true"
        })
    );
}

#[test]
fn test_blocking_payload_with_user_and_secrets() {
    let secrets: UserSecrets = [("OPENAI_KEY", "sk-1")].into_iter().collect();
    let request = ChatRequest::new()
        .with_user_id("u1")
        .with_user_secrets(secrets);

    let value = serde_json::to_value(request.to_payload(StreamMode::Blocking)).unwrap();

    assert_eq!(value["stream"], json!("false"));
    assert_eq!(value["userId"], json!("u1"));
    assert_eq!(value["userSecrets"], json!({"OPENAI_KEY": "sk-1"}));
    assert_eq!(value["variables"], json!({}));
    assert_eq!(value["messages"], json!([]));
}

#[test]
fn test_message_order_is_preserved() {
    let first = ChatMessage::new(Role::User, "a", "1", "2024-01-02T00:00:00Z");
    let second = ChatMessage::new(Role::Ai, "b", "2", "2024-01-01T00:00:00Z");
    let request = ChatRequest::new().with_messages(vec![first, second]);

    let value = serde_json::to_value(request.to_payload(StreamMode::Streaming)).unwrap();
    let ids: Vec<_> = value["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(ids, vec!["1", "2"]);
}
