//! Transcript retrieval with language fallback and a secondary actor.
//!
//! Each actor run is submitted once and then polled on a fixed interval. Every
//! poll produces a [`PollAttempt`]; `tokio_retry` drives the loop and stops
//! early on anything that is not worth waiting for.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

use crate::clients::apify::{ActorRun, RunStatus, ScrapingService};
use crate::core::config::AppConfig;
use crate::core::models::{Language, TranscriptResult};
use crate::errors::{ClientError, FetchError};

/// Anything that can turn a canonical video URL into a transcript.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// `Ok(None)` is the normal "no transcript anywhere" outcome.
    async fn fetch(&self, canonical_url: &str) -> Result<Option<TranscriptResult>, FetchError>;

    /// Best-effort title lookup for when the transcript carried none.
    async fn fetch_title(&self, _canonical_url: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub primary_actor: String,
    pub backup_actor: String,
    pub title_actor: Option<String>,
    pub languages: Vec<Language>,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl FetchPlan {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            primary_actor: config.primary_actor_id.clone(),
            backup_actor: config.backup_actor_id.clone(),
            title_actor: config.title_actor_id.clone(),
            languages: config.transcript_languages.clone(),
            poll_attempts: config.poll_attempts,
            poll_interval: config.poll_interval,
        }
    }
}

/// Result of a single poll of an actor run.
#[derive(Debug)]
pub enum PollAttempt<T> {
    Ready(T),
    /// The run finished without usable output, or ended in a failure state.
    Empty,
    Pending,
    Transient(ClientError),
    Fatal(ClientError),
}

/// Result of driving one actor run to completion or to the attempt ceiling.
#[derive(Debug)]
pub enum ActorOutcome<T> {
    Found(T),
    Nothing,
    Fatal(ClientError),
}

pub struct TranscriptFetcher {
    service: Arc<dyn ScrapingService>,
    plan: FetchPlan,
}

impl TranscriptFetcher {
    pub fn new(service: Arc<dyn ScrapingService>, plan: FetchPlan) -> Self {
        Self { service, plan }
    }

    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    /// Submit `input` to `actor_id` and poll until the run yields something
    /// `extract` accepts, ends empty, or the attempt ceiling is reached.
    ///
    /// The submit is followed by up to `poll_attempts` status polls. A failed
    /// submit is retried in place of a poll.
    pub async fn run_actor<T, F>(&self, actor_id: &str, input: &Value, extract: F) -> ActorOutcome<T>
    where
        T: Send,
        F: Fn(&[Value]) -> Option<T> + Send + Sync,
    {
        let run: Mutex<Option<ActorRun>> = Mutex::new(None);
        let strategy =
            FixedInterval::new(self.plan.poll_interval).take(self.plan.poll_attempts as usize);

        let run = &run;
        let extract = &extract;
        let result = Retry::spawn(strategy, move || async move {
            match self.poll_once(actor_id, input, run, extract).await {
                PollAttempt::Ready(value) => Ok(ActorOutcome::Found(value)),
                PollAttempt::Empty => Ok(ActorOutcome::Nothing),
                PollAttempt::Fatal(error) => Ok(ActorOutcome::Fatal(error)),
                PollAttempt::Pending => Err(None),
                PollAttempt::Transient(error) => {
                    debug!(actor_id, error = %error, "transient error while polling actor");
                    Err(Some(error))
                }
            }
        })
        .await;

        result.unwrap_or_else(|last_error: Option<ClientError>| {
            match last_error {
                Some(error) => warn!(actor_id, error = %error, "gave up on actor run after errors"),
                None => warn!(actor_id, "actor run still pending at attempt ceiling"),
            }
            ActorOutcome::Nothing
        })
    }

    async fn poll_once<T, F>(
        &self,
        actor_id: &str,
        input: &Value,
        run: &Mutex<Option<ActorRun>>,
        extract: &F,
    ) -> PollAttempt<T>
    where
        F: Fn(&[Value]) -> Option<T> + Send + Sync,
    {
        let current = run.lock().unwrap_or_else(PoisonError::into_inner).clone();

        let state = match current {
            None => self.service.start_run(actor_id, input).await,
            Some(existing) => self.service.run_state(&existing.id).await,
        };
        let state = match state {
            Ok(state) => state,
            Err(error) => return classify(error),
        };
        *run.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());

        match &state.status {
            RunStatus::Succeeded => {
                let Some(dataset_id) = state.dataset_id.as_deref() else {
                    return PollAttempt::Empty;
                };
                match self.service.dataset_items(dataset_id).await {
                    Ok(items) => extract(&items).map_or(PollAttempt::Empty, PollAttempt::Ready),
                    Err(error) => classify(error),
                }
            }
            status if status.is_terminal() => {
                debug!(actor_id, run_id = %state.id, ?status, "actor run ended without success");
                PollAttempt::Empty
            }
            _ => PollAttempt::Pending,
        }
    }

    async fn fetch_primary(&self, url: &str) -> Result<Option<TranscriptResult>, FetchError> {
        for &language in &self.plan.languages {
            info!(language = %language, "requesting transcript");
            let input = json!({
                "startUrls": [url],
                "language": language.as_str(),
                "includeTimestamps": "No",
            });
            match self
                .run_actor(&self.plan.primary_actor, &input, primary_transcript)
                .await
            {
                ActorOutcome::Found((text, video_title)) => {
                    info!(language = %language, chars = text.chars().count(), "transcript found");
                    return Ok(Some(TranscriptResult {
                        text,
                        language,
                        video_title,
                    }));
                }
                ActorOutcome::Nothing => info!(language = %language, "no transcript, trying next"),
                ActorOutcome::Fatal(error) => return Err(FetchError::Credentials(error)),
            }
        }
        Ok(None)
    }

    async fn fetch_backup(&self, url: &str) -> Result<Option<TranscriptResult>, FetchError> {
        info!(actor = %self.plan.backup_actor, "falling back to secondary actor");
        let input = json!({
            "startUrls": [url],
            "maxRequestRetries": 2,
        });
        match self
            .run_actor(&self.plan.backup_actor, &input, backup_transcript)
            .await
        {
            ActorOutcome::Found((text, video_title)) => Ok(Some(TranscriptResult {
                text,
                language: Language::Backup,
                video_title,
            })),
            ActorOutcome::Nothing => Ok(None),
            ActorOutcome::Fatal(error) => Err(FetchError::Credentials(error)),
        }
    }
}

#[async_trait]
impl TranscriptSource for TranscriptFetcher {
    async fn fetch(&self, canonical_url: &str) -> Result<Option<TranscriptResult>, FetchError> {
        if let Some(found) = self.fetch_primary(canonical_url).await? {
            return Ok(Some(found));
        }
        self.fetch_backup(canonical_url).await
    }

    async fn fetch_title(&self, canonical_url: &str) -> Option<String> {
        let actor = self.plan.title_actor.as_deref()?;
        let input = json!({
            "startUrls": [{"url": canonical_url}],
            "maxRequestRetries": 2,
        });
        match self.run_actor(actor, &input, title_only).await {
            ActorOutcome::Found(title) => Some(title),
            ActorOutcome::Nothing => None,
            ActorOutcome::Fatal(error) => {
                warn!(error = %error, "title lookup rejected");
                None
            }
        }
    }
}

fn classify<T>(error: ClientError) -> PollAttempt<T> {
    if error.is_fatal() {
        PollAttempt::Fatal(error)
    } else {
        PollAttempt::Transient(error)
    }
}

/// Text from a field that is either a plain string or an array of `{text}` segments.
fn field_text(item: &Value, key: &str) -> Option<String> {
    let text = match item.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(segments) => segments
            .iter()
            .filter_map(|segment| match segment {
                Value::String(s) => Some(s.trim()),
                other => other.get("text").and_then(Value::as_str).map(str::trim),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field_text(item, key))
}

/// All items' text joined with spaces; title from the first item that has one.
fn primary_transcript(items: &[Value]) -> Option<(String, Option<String>)> {
    let text = items
        .iter()
        .filter_map(|item| first_field(item, &["transcript", "text"]))
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        return None;
    }
    let title = items
        .iter()
        .find_map(|item| first_field(item, &["videoTitle", "title"]));
    Some((text.trim().to_string(), title))
}

/// The first item carrying any recognizable text field wins.
fn backup_transcript(items: &[Value]) -> Option<(String, Option<String>)> {
    items.iter().find_map(|item| {
        let text = first_field(item, &["transcript", "text", "content", "subtitle"])?;
        let title = first_field(item, &["videoTitle", "title", "name"]);
        Some((text, title))
    })
}

fn title_only(items: &[Value]) -> Option<String> {
    items
        .iter()
        .find_map(|item| first_field(item, &["title", "videoTitle"]))
}
