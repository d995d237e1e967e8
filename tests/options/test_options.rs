//! Tests for `SessionOptions` defaults, builder and environment loading

use std::collections::HashMap;
use std::time::Duration;

use chatbot_session::types::options::{
    DEFAULT_TOKEN_LIMIT, ENV_INIT_TIMEOUT_MS, ENV_MIN_INTERVAL_MS, ENV_SETTLE_DELAY_MS,
    ENV_TOKEN_LIMIT,
};
use chatbot_session::{ChatError, SessionOptions};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_defaults() {
    let options = SessionOptions::default();
    assert_eq!(options.min_interval, Duration::from_millis(2000));
    assert_eq!(options.init_timeout, Duration::from_secs(30));
    assert_eq!(options.settle_delay, Duration::from_millis(500));
    assert_eq!(options.token_limit, Some(DEFAULT_TOKEN_LIMIT));
    assert!(options.validate().is_ok());
}

#[test]
fn test_builder_overrides() {
    let options = SessionOptions::builder()
        .min_interval(Duration::from_millis(250))
        .init_timeout(Duration::from_secs(5))
        .settle_delay(Duration::ZERO)
        .token_limit(128)
        .build();

    assert_eq!(options.min_interval, Duration::from_millis(250));
    assert_eq!(options.init_timeout, Duration::from_secs(5));
    assert_eq!(options.settle_delay, Duration::ZERO);
    assert_eq!(options.token_limit, Some(128));

    let unlimited = SessionOptions::builder().unlimited_history().build();
    assert_eq!(unlimited.token_limit, None);
}

#[test]
fn test_empty_environment_gives_defaults() {
    let options = SessionOptions::from_lookup(lookup(&[])).unwrap();
    assert_eq!(options, SessionOptions::default());
}

#[test]
fn test_environment_overrides() {
    let options = SessionOptions::from_lookup(lookup(&[
        (ENV_MIN_INTERVAL_MS, "1500"),
        (ENV_INIT_TIMEOUT_MS, " 10000 "),
        (ENV_SETTLE_DELAY_MS, "0"),
        (ENV_TOKEN_LIMIT, "2048"),
    ]))
    .unwrap();

    assert_eq!(options.min_interval, Duration::from_millis(1500));
    assert_eq!(options.init_timeout, Duration::from_secs(10));
    assert_eq!(options.settle_delay, Duration::ZERO);
    assert_eq!(options.token_limit, Some(2048));
}

#[test]
fn test_zero_token_limit_disables_truncation() {
    let options = SessionOptions::from_lookup(lookup(&[(ENV_TOKEN_LIMIT, "0")])).unwrap();
    assert_eq!(options.token_limit, None);
}

#[test]
fn test_invalid_integer_is_rejected() {
    let err = SessionOptions::from_lookup(lookup(&[(ENV_MIN_INTERVAL_MS, "two seconds")]))
        .unwrap_err();
    match err {
        ChatError::InvalidConfig(msg) => assert!(msg.contains(ENV_MIN_INTERVAL_MS)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_zero_init_timeout_is_rejected() {
    let err = SessionOptions::from_lookup(lookup(&[(ENV_INIT_TIMEOUT_MS, "0")])).unwrap_err();
    assert!(matches!(err, ChatError::InvalidConfig(_)));
    assert_eq!(err.reason(), "invalid_config");
}

#[test]
fn test_json_uses_millisecond_fields() {
    let json = serde_json::to_value(SessionOptions::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "minIntervalMs": 2000,
            "initTimeoutMs": 30000,
            "settleDelayMs": 500,
            "tokenLimit": 4000,
        })
    );

    let partial: SessionOptions = serde_json::from_str(r#"{"minIntervalMs": 100}"#).unwrap();
    assert_eq!(partial.min_interval, Duration::from_millis(100));
    assert_eq!(partial.init_timeout, Duration::from_secs(30));
}

#[test]
fn test_zero_token_limit_from_builder_or_json_is_unlimited() {
    let options = SessionOptions::builder().token_limit(0).build();
    assert_eq!(options.token_limit, None);
    assert!(options.validate().is_ok());

    let options: SessionOptions = serde_json::from_str(r#"{"tokenLimit": 0}"#).unwrap();
    assert_eq!(options.token_limit, None);

    let options: SessionOptions = serde_json::from_str(r#"{"tokenLimit": null}"#).unwrap();
    assert_eq!(options.token_limit, None);
}

#[test]
fn test_validate_rejects_zero_token_limit_set_directly() {
    let options = SessionOptions {
        token_limit: Some(0),
        ..SessionOptions::default()
    };
    assert!(matches!(
        options.validate(),
        Err(ChatError::InvalidConfig(_))
    ));
}
