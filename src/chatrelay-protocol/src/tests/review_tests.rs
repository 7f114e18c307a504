//! Tests for review module.

use crate::review::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_review_with_all_fields() {
    let review = ReviewPayload::new("c1")
        .with_user_id("u1")
        .with_score(5)
        .with_text("great");

    assert_eq!(
        serde_json::to_value(&review).unwrap(),
        json!({"chatId": "c1", "userId": "u1", "reviewScore": 5, "reviewText": "great"})
    );
}

#[test]
fn test_review_absent_fields_serialize_as_null() {
    let review = ReviewPayload::new("c1");

    assert_eq!(
        serde_json::to_value(&review).unwrap(),
        json!({"chatId": "c1", "userId": null, "reviewScore": null, "reviewText": null})
    );
}

#[test]
fn test_review_partial_fields_keep_all_keys() {
    let review = ReviewPayload::new("c2").with_score(-1);
    let value = serde_json::to_value(&review).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<_> = object.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["chatId", "reviewScore", "reviewText", "userId"]);
    assert_eq!(object["reviewScore"], json!(-1));
    assert!(object["reviewText"].is_null());
}
