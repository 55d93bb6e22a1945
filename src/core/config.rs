use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::core::models::{DedupPolicy, DeliveryMode, Language};
use crate::errors::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONCURRENT: usize = 5;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PRIMARY_ACTOR: &str = "dB9f4B02ocpTICIEY";
pub const DEFAULT_BACKUP_ACTOR: &str = "drobnikj/youtube-transcript-extractor";
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_CHAT_APP: &str = "KakaoTalk";
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;
pub const DEFAULT_TYPING_CHUNK_CHARS: usize = 50;
pub const DEFAULT_MANUAL_PAUSE_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub apify_api_token: String,
    pub gemini_api_key: String,
    pub bind_addr: SocketAddr,
    pub max_concurrent_requests: usize,
    pub gemini_model: String,
    pub primary_actor_id: String,
    pub backup_actor_id: String,
    pub title_actor_id: Option<String>,
    pub transcript_languages: Vec<Language>,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub dedup_policy: DedupPolicy,
    pub delivery_mode: DeliveryMode,
    pub chat_app_process: String,
    pub chat_window_title: String,
    pub max_message_chars: usize,
    pub typing_chunk_chars: usize,
    pub manual_pause: Duration,
    pub console_room: Option<String>,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let apify_api_token = get("APIFY_API_TOKEN").ok_or(ConfigError::Missing("APIFY_API_TOKEN"))?;
        let gemini_api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let port: u16 = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let host: IpAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), IpAddr::from([0, 0, 0, 0]))?;

        let max_concurrent_requests =
            parse_or("MAX_CONCURRENT_REQUESTS", get("MAX_CONCURRENT_REQUESTS"), DEFAULT_MAX_CONCURRENT)?;
        if max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONCURRENT_REQUESTS",
                value: "0".to_string(),
            });
        }

        let transcript_languages = match get("TRANSCRIPT_LANGUAGES") {
            Some(raw) => {
                let parsed = raw
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(Language::from_str)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| ConfigError::Invalid {
                        key: "TRANSCRIPT_LANGUAGES",
                        value: raw.clone(),
                    })?;
                if parsed.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "TRANSCRIPT_LANGUAGES",
                        value: raw,
                    });
                }
                parsed
            }
            None => vec![Language::Korean, Language::English, Language::Japanese],
        };

        let poll_attempts = parse_or("POLL_ATTEMPTS", get("POLL_ATTEMPTS"), DEFAULT_POLL_ATTEMPTS)?;
        if poll_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "POLL_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let poll_interval_secs: u64 =
            parse_or("POLL_INTERVAL_SECS", get("POLL_INTERVAL_SECS"), DEFAULT_POLL_INTERVAL_SECS)?;
        let manual_pause_secs: u64 =
            parse_or("MANUAL_PAUSE_SECS", get("MANUAL_PAUSE_SECS"), DEFAULT_MANUAL_PAUSE_SECS)?;

        let chat_app_process = get("CHAT_APP_PROCESS").unwrap_or_else(|| DEFAULT_CHAT_APP.to_string());
        let chat_window_title = get("CHAT_WINDOW_TITLE").unwrap_or_else(|| chat_app_process.clone());

        Ok(Self {
            apify_api_token,
            gemini_api_key,
            bind_addr: SocketAddr::new(host, port),
            max_concurrent_requests,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            primary_actor_id: get("APIFY_ACTOR_ID").unwrap_or_else(|| DEFAULT_PRIMARY_ACTOR.to_string()),
            backup_actor_id: get("APIFY_BACKUP_ACTOR_ID")
                .unwrap_or_else(|| DEFAULT_BACKUP_ACTOR.to_string()),
            title_actor_id: get("APIFY_TITLE_ACTOR_ID"),
            transcript_languages,
            poll_attempts,
            poll_interval: Duration::from_secs(poll_interval_secs),
            dedup_policy: parse_or("DEDUP_POLICY", get("DEDUP_POLICY"), DedupPolicy::default())?,
            delivery_mode: parse_or("DELIVERY_MODE", get("DELIVERY_MODE"), DeliveryMode::default())?,
            chat_app_process,
            chat_window_title,
            max_message_chars: parse_or(
                "MAX_MESSAGE_CHARS",
                get("MAX_MESSAGE_CHARS"),
                DEFAULT_MAX_MESSAGE_CHARS,
            )?,
            typing_chunk_chars: parse_or(
                "TYPING_CHUNK_CHARS",
                get("TYPING_CHUNK_CHARS"),
                DEFAULT_TYPING_CHUNK_CHARS,
            )?
            .max(1),
            manual_pause: Duration::from_secs(manual_pause_secs),
            console_room: get("CONSOLE_ROOM"),
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
