use std::collections::HashMap;
use std::time::Duration;

use tubetldr::core::config::{AppConfig, DEFAULT_BACKUP_ACTOR, DEFAULT_PRIMARY_ACTOR};
use tubetldr::core::models::{DedupPolicy, DeliveryMode, Language};
use tubetldr::errors::ConfigError;

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

const SECRETS: [(&str, &str); 2] = [("APIFY_API_TOKEN", "apify"), ("GEMINI_API_KEY", "gemini")];

#[test]
fn test_defaults() {
    let config = config_from(&SECRETS).unwrap();

    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(config.max_concurrent_requests, 5);
    assert_eq!(config.gemini_model, "gemini-1.5-flash");
    assert_eq!(config.primary_actor_id, DEFAULT_PRIMARY_ACTOR);
    assert_eq!(config.backup_actor_id, DEFAULT_BACKUP_ACTOR);
    assert_eq!(config.title_actor_id, None);
    assert_eq!(
        config.transcript_languages,
        vec![Language::Korean, Language::English, Language::Japanese]
    );
    assert_eq!(config.poll_attempts, 10);
    assert_eq!(config.poll_interval, Duration::from_secs(2));
    assert_eq!(config.dedup_policy, DedupPolicy::AfterSuccess);
    assert_eq!(config.delivery_mode, DeliveryMode::Response);
    assert_eq!(config.chat_app_process, "KakaoTalk");
    assert_eq!(config.chat_window_title, "KakaoTalk");
    assert_eq!(config.max_message_chars, 500);
    assert_eq!(config.typing_chunk_chars, 50);
    assert_eq!(config.manual_pause, Duration::from_secs(10));
}

#[test]
fn test_missing_secrets_are_fatal() {
    let err = config_from(&[("GEMINI_API_KEY", "gemini")]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("APIFY_API_TOKEN")));

    let err = config_from(&[("APIFY_API_TOKEN", "apify"), ("GEMINI_API_KEY", "  ")]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("GEMINI_API_KEY")));
}

#[test]
fn test_overrides() {
    let mut pairs = SECRETS.to_vec();
    pairs.extend([
        ("PORT", "9000"),
        ("BIND_ADDR", "127.0.0.1"),
        ("MAX_CONCURRENT_REQUESTS", "2"),
        ("TRANSCRIPT_LANGUAGES", "en, ko"),
        ("DEDUP_POLICY", "on_attempt"),
        ("DELIVERY_MODE", "clipboard"),
        ("CHAT_APP_PROCESS", "Slack"),
        ("APIFY_TITLE_ACTOR_ID", "someone/title"),
    ]);
    let config = config_from(&pairs).unwrap();

    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
    assert_eq!(config.max_concurrent_requests, 2);
    assert_eq!(
        config.transcript_languages,
        vec![Language::English, Language::Korean]
    );
    assert_eq!(config.dedup_policy, DedupPolicy::OnAttempt);
    assert_eq!(config.delivery_mode, DeliveryMode::Clipboard);
    assert_eq!(config.chat_window_title, "Slack");
    assert_eq!(config.title_actor_id.as_deref(), Some("someone/title"));
}

#[test]
fn test_invalid_values_are_rejected() {
    for (key, value) in [
        ("PORT", "eighty"),
        ("MAX_CONCURRENT_REQUESTS", "0"),
        ("POLL_ATTEMPTS", "0"),
        ("TRANSCRIPT_LANGUAGES", "Klingon"),
        ("TRANSCRIPT_LANGUAGES", ","),
        ("DELIVERY_MODE", "carrier-pigeon"),
    ] {
        let mut pairs = SECRETS.to_vec();
        pairs.push((key, value));
        let err = config_from(&pairs).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
            "{key}={value} gave {err:?}"
        );
    }
}
