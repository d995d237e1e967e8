//! Tests for conversation text composition and truncation

use chatbot_session::TurnRequest;
use chatbot_session::conversation::{
    compose, estimate_tokens, truncate_to_budget, updated_history,
};

#[test]
fn test_first_turn_has_no_history_prefix() {
    assert_eq!(compose(None, "Hello", None), "User: Hello");
    assert_eq!(compose(Some(""), "Hello", None), "User: Hello");
}

#[test]
fn test_later_turn_appends_to_history() {
    let history = "User: Hello\n\nAssistant: Hi there";
    assert_eq!(
        compose(Some(history), "Pricing?", None),
        "User: Hello\n\nAssistant: Hi there\n\nUser: Pricing?"
    );
}

#[test]
fn test_updated_history_appends_answer() {
    assert_eq!(
        updated_history("User: Hello", "Hi there"),
        "User: Hello\n\nAssistant: Hi there"
    );
}

#[test]
fn test_estimate_tokens_uses_byte_length() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcdefg"), 1);
    assert_eq!(estimate_tokens(&"a".repeat(400)), 100);
}

#[test]
fn test_within_budget_is_untouched() {
    let text = "User: short".to_string();
    assert_eq!(truncate_to_budget(text.clone(), 100), text);
    assert_eq!(compose(None, "short", Some(100)), "User: short");
}

#[test]
fn test_over_budget_keeps_tail() {
    let text = format!("{}User: newest", "old ".repeat(50));
    let truncated = truncate_to_budget(text, 4);
    assert_eq!(truncated.len(), 16);
    assert!(truncated.ends_with("User: newest"));
}

#[test]
fn test_truncation_respects_char_boundaries() {
    // Each 'é' is two bytes; the cut point lands inside one.
    let text = format!("{}end", "é".repeat(20));
    let truncated = truncate_to_budget(text, 2);
    assert!(truncated.len() <= 8);
    assert!(truncated.ends_with("end"));
    assert!(truncated.starts_with('é'));
}

#[test]
fn test_empty_history_treated_as_absent() {
    let request = TurnRequest::new("hi", Some(String::new()));
    assert_eq!(request.history(), None);

    let request = TurnRequest::new("hi", Some("User: x".into()));
    assert_eq!(request.history(), Some("User: x"));
}

#[test]
fn test_request_json_uses_frontend_field_names() {
    let request: TurnRequest = serde_json::from_str(
        r#"{"message":"hello","conversationHistory":"User: a\n\nAssistant: b"}"#,
    )
    .unwrap();
    assert_eq!(request.message, "hello");
    assert_eq!(request.history(), Some("User: a\n\nAssistant: b"));

    let missing: TurnRequest = serde_json::from_str("{}").unwrap();
    assert!(missing.validate().is_err());
}

#[test]
fn test_only_empty_message_is_invalid() {
    assert!(TurnRequest::new("", None).validate().is_err());
    assert!(TurnRequest::new(" ", None).validate().is_ok());
    assert!(TurnRequest::new("hi", None).validate().is_ok());
}
