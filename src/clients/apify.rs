//! Apify REST client module
//!
//! Starts actor runs, reads run state, and pulls dataset items. Polling and
//! fallback policy live in the transcript worker, not here.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::errors::{ClientError, ConfigError};

const APIFY_BASE_URL: &str = "https://api.apify.com/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
    Other(String),
}

impl RunStatus {
    #[must_use]
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "READY" => RunStatus::Ready,
            "RUNNING" => RunStatus::Running,
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "ABORTING" | "ABORTED" => RunStatus::Aborted,
            "TIMING-OUT" | "TIMED-OUT" => RunStatus::TimedOut,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// True once the run will never change state again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRun {
    pub id: String,
    pub status: RunStatus,
    pub dataset_id: Option<String>,
}

/// The three calls the transcript worker needs from a scraping platform.
#[async_trait]
pub trait ScrapingService: Send + Sync {
    async fn start_run(&self, actor_id: &str, input: &Value) -> Result<ActorRun, ClientError>;

    async fn run_state(&self, run_id: &str) -> Result<ActorRun, ClientError>;

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>, ClientError>;
}

pub struct ApifyClient {
    token: String,
    base_url: String,
    http: Client,
}

impl ApifyClient {
    pub fn new(token: String) -> Result<Self, ConfigError> {
        if token.trim().is_empty() {
            return Err(ConfigError::Missing("APIFY_API_TOKEN"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self {
            token,
            base_url: APIFY_BASE_URL.to_string(),
            http,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl ScrapingService for ApifyClient {
    async fn start_run(&self, actor_id: &str, input: &Value) -> Result<ActorRun, ClientError> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_path(actor_id));
        debug!(actor_id, "starting actor run");
        let body = self.send_json(self.http.post(url).json(input)).await?;
        parse_run(&body)
    }

    async fn run_state(&self, run_id: &str) -> Result<ActorRun, ClientError> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let body = self.send_json(self.http.get(url)).await?;
        parse_run(&body)
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>, ClientError> {
        let url = format!("{}/datasets/{}/items", self.base_url, dataset_id);
        let body = self
            .send_json(self.http.get(url).query(&[("clean", "true"), ("format", "json")]))
            .await?;
        match body {
            Value::Array(items) => Ok(items),
            other => Err(ClientError::Malformed(format!(
                "dataset items were not an array: {other}"
            ))),
        }
    }
}

/// Actor ids written as `user/name` go into the URL as `user~name`.
#[must_use]
pub fn actor_path(actor_id: &str) -> String {
    actor_id.replace('/', "~")
}

/// Read the `data` envelope Apify wraps around run objects.
pub fn parse_run(body: &Value) -> Result<ActorRun, ClientError> {
    let data = body.get("data").unwrap_or(body);
    let id = data
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Malformed("run object missing id".to_string()))?;
    let status = data
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::Malformed("run object missing status".to_string()))?;
    let dataset_id = data
        .get("defaultDatasetId")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Ok(ActorRun {
        id: id.to_string(),
        status: RunStatus::from_api(status),
        dataset_id,
    })
}
