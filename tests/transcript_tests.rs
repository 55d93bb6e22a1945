use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tubetldr::clients::apify::{ActorRun, RunStatus, ScrapingService};
use tubetldr::core::models::Language;
use tubetldr::errors::{ClientError, FetchError};
use tubetldr::worker::transcript::{FetchPlan, TranscriptFetcher, TranscriptSource};

const URL: &str = "https://www.youtube.com/watch?v=abc123XYZ9";
const PRIMARY: &str = "primary";
const BACKUP: &str = "backup/actor";
const TITLE: &str = "title-actor";

/// How a scripted run behaves.
#[derive(Clone)]
enum Script {
    Succeed(Vec<Value>),
    EmptyDataset,
    FailRun,
    PendingForever,
    /// The first `n` status polls fail with a network error, then the run succeeds.
    FlakyPolls(usize, Vec<Value>),
    SubmitError,
    Unauthorized,
}

#[derive(Default)]
struct MockApify {
    scripts: HashMap<String, Script>,
    runs: Mutex<HashMap<String, (Script, usize)>>,
    starts: Mutex<Vec<String>>,
}

impl MockApify {
    fn with(mut self, key: &str, script: Script) -> Self {
        self.scripts.insert(key.to_string(), script);
        self
    }

    fn starts(&self) -> Vec<String> {
        self.starts.lock().unwrap().clone()
    }

    fn starts_of(&self, key: &str) -> usize {
        self.starts().iter().filter(|k| k.as_str() == key).count()
    }

    fn polls_of(&self, run_id: &str) -> usize {
        self.runs.lock().unwrap().get(run_id).map_or(0, |(_, polls)| *polls)
    }
}

fn key_for(actor_id: &str, input: &Value) -> String {
    match input.get("language").and_then(Value::as_str) {
        Some(language) => format!("{actor_id}:{language}"),
        None => actor_id.to_string(),
    }
}

#[async_trait]
impl ScrapingService for MockApify {
    async fn start_run(&self, actor_id: &str, input: &Value) -> Result<ActorRun, ClientError> {
        let key = key_for(actor_id, input);
        self.starts.lock().unwrap().push(key.clone());
        let script = self.scripts.get(&key).cloned().unwrap_or(Script::FailRun);

        match script {
            Script::Unauthorized => return Err(ClientError::Unauthorized(401)),
            Script::SubmitError => {
                return Err(ClientError::Status {
                    status: 503,
                    body: "busy".to_string(),
                });
            }
            _ => {}
        }

        let mut runs = self.runs.lock().unwrap();
        let id = format!("run-{}", runs.len() + 1);
        runs.insert(id.clone(), (script, 0));
        Ok(ActorRun {
            id: id.clone(),
            status: RunStatus::Running,
            dataset_id: Some(id),
        })
    }

    async fn run_state(&self, run_id: &str) -> Result<ActorRun, ClientError> {
        let mut runs = self.runs.lock().unwrap();
        let (script, polls) = runs.get_mut(run_id).expect("unknown run");
        *polls += 1;
        let status = match script {
            Script::PendingForever => RunStatus::Running,
            Script::FailRun => RunStatus::Failed,
            Script::FlakyPolls(n, _) if *polls <= *n => {
                return Err(ClientError::Http("connection reset".to_string()));
            }
            _ => RunStatus::Succeeded,
        };
        Ok(ActorRun {
            id: run_id.to_string(),
            status,
            dataset_id: Some(run_id.to_string()),
        })
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>, ClientError> {
        let runs = self.runs.lock().unwrap();
        match &runs.get(dataset_id).expect("unknown dataset").0 {
            Script::Succeed(items) | Script::FlakyPolls(_, items) => Ok(items.clone()),
            _ => Ok(vec![]),
        }
    }
}

fn plan(poll_attempts: u32) -> FetchPlan {
    FetchPlan {
        primary_actor: PRIMARY.to_string(),
        backup_actor: BACKUP.to_string(),
        title_actor: Some(TITLE.to_string()),
        languages: vec![Language::Korean, Language::English, Language::Japanese],
        poll_attempts,
        poll_interval: Duration::ZERO,
    }
}

fn fetcher(mock: &Arc<MockApify>, poll_attempts: u32) -> TranscriptFetcher {
    let service: Arc<dyn ScrapingService> = mock.clone();
    TranscriptFetcher::new(service, plan(poll_attempts))
}

#[tokio::test]
async fn test_first_language_with_text_wins() {
    let mock = Arc::new(MockApify::default().with(
        "primary:Korean",
        Script::Succeed(vec![json!({"transcript": "안녕하세요", "videoTitle": "인사"})]),
    ));

    let result = fetcher(&mock, 3).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.text, "안녕하세요");
    assert_eq!(result.language, Language::Korean);
    assert_eq!(result.video_title.as_deref(), Some("인사"));
    assert_eq!(mock.starts(), vec!["primary:Korean"]);
}

#[tokio::test]
async fn test_empty_and_failed_languages_fall_through() {
    let mock = Arc::new(
        MockApify::default()
            .with("primary:Korean", Script::EmptyDataset)
            .with("primary:English", Script::FailRun)
            .with(
                "primary:Japanese",
                Script::Succeed(vec![json!({"text": "こんにちは"})]),
            ),
    );

    let result = fetcher(&mock, 3).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.language, Language::Japanese);
    assert_eq!(result.video_title, None);
    assert_eq!(
        mock.starts(),
        vec!["primary:Korean", "primary:English", "primary:Japanese"]
    );
    // An explicitly empty language is abandoned, not resubmitted.
    assert_eq!(mock.starts_of("primary:Korean"), 1);
}

#[tokio::test]
async fn test_secondary_actor_invoked_exactly_once_when_all_languages_empty() {
    let mock = Arc::new(
        MockApify::default()
            .with("primary:Korean", Script::EmptyDataset)
            .with("primary:English", Script::EmptyDataset)
            .with("primary:Japanese", Script::EmptyDataset)
            .with(BACKUP, Script::EmptyDataset),
    );

    let result = fetcher(&mock, 3).fetch(URL).await.unwrap();

    assert!(result.is_none());
    assert_eq!(mock.starts_of(BACKUP), 1);
}

#[tokio::test]
async fn test_secondary_actor_result_is_tagged_backup() {
    let mock = Arc::new(MockApify::default().with(
        BACKUP,
        Script::Succeed(vec![json!({"content": "backup text", "name": "Backup Title"})]),
    ));

    let result = fetcher(&mock, 2).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.language, Language::Backup);
    assert_eq!(result.text, "backup text");
    assert_eq!(result.video_title.as_deref(), Some("Backup Title"));
}

#[tokio::test]
async fn test_pending_run_is_abandoned_at_attempt_ceiling() {
    let mock = Arc::new(
        MockApify::default()
            .with("primary:Korean", Script::PendingForever)
            .with(
                "primary:English",
                Script::Succeed(vec![json!({"transcript": "hello"})]),
            ),
    );

    let result = fetcher(&mock, 4).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.language, Language::English);
    assert_eq!(mock.starts_of("primary:Korean"), 1);
    assert_eq!(mock.polls_of("run-1"), 4);
}

#[tokio::test]
async fn test_transient_poll_errors_are_retried() {
    let mock = Arc::new(MockApify::default().with(
        "primary:Korean",
        Script::FlakyPolls(2, vec![json!({"transcript": "recovered"})]),
    ));

    let result = fetcher(&mock, 4).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.text, "recovered");
    assert_eq!(result.language, Language::Korean);
    assert_eq!(mock.polls_of("run-1"), 3);
}

#[tokio::test]
async fn test_failed_submit_consumes_attempts() {
    let mock = Arc::new(
        MockApify::default()
            .with("primary:Korean", Script::SubmitError)
            .with(
                "primary:English",
                Script::Succeed(vec![json!({"transcript": "ok"})]),
            ),
    );

    let result = fetcher(&mock, 3).fetch(URL).await.unwrap().unwrap();

    assert_eq!(result.language, Language::English);
    // The initial submit plus one resubmit per poll slot.
    assert_eq!(mock.starts_of("primary:Korean"), 4);
}

#[tokio::test]
async fn test_rejected_credentials_are_fatal() {
    let mock = Arc::new(MockApify::default().with("primary:Korean", Script::Unauthorized));

    let err = fetcher(&mock, 5).fetch(URL).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::Credentials(ClientError::Unauthorized(401))
    ));
    assert_eq!(mock.starts(), vec!["primary:Korean"]);
}

#[tokio::test]
async fn test_title_lookup_uses_title_actor() {
    let mock = Arc::new(MockApify::default().with(
        TITLE,
        Script::Succeed(vec![json!({"title": "Looked Up"})]),
    ));

    let title = fetcher(&mock, 2).fetch_title(URL).await;

    assert_eq!(title.as_deref(), Some("Looked Up"));
}

#[tokio::test]
async fn test_title_lookup_without_actor_is_none() {
    let mock = Arc::new(MockApify::default());
    let service: Arc<dyn ScrapingService> = mock.clone();
    let mut without_title = plan(2);
    without_title.title_actor = None;

    let title = TranscriptFetcher::new(service, without_title)
        .fetch_title(URL)
        .await;

    assert_eq!(title, None);
    assert!(mock.starts().is_empty());
}
