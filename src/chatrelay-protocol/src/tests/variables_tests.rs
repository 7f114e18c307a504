//! Tests for variables module.

use crate::variables::*;
use serde_json::json;

#[test]
fn test_filled_variables_insert_replaces() {
    let mut vars = FilledVariables::new();
    assert!(vars.is_empty());
    assert_eq!(vars.insert("name", "Ada"), None);
    assert_eq!(vars.insert("name", "Grace"), Some("Ada".to_string()));
    assert_eq!(vars.get("name"), Some("Grace"));
    assert_eq!(vars.len(), 1);
}

#[test]
fn test_filled_variables_serialize_as_plain_object() {
    let vars: FilledVariables = [("b", "2"), ("a", "1")].into_iter().collect();
    assert_eq!(serde_json::to_value(&vars).unwrap(), json!({"a": "1", "b": "2"}));
}

#[test]
fn test_user_secrets_debug_hides_values() {
    let secrets: UserSecrets = [("API_TOKEN", "super-secret-value")].into_iter().collect();
    let debug = format!("{secrets:?}");

    assert!(debug.contains("API_TOKEN"));
    assert!(!debug.contains("super-secret-value"));
}

#[test]
fn test_user_secrets_serialize_values() {
    let mut secrets = UserSecrets::new();
    secrets.insert("K", "v");
    assert_eq!(serde_json::to_value(&secrets).unwrap(), json!({"K": "v"}));
    assert_eq!(secrets.names().collect::<Vec<_>>(), vec!["K"]);
}
