use thiserror::Error;

use crate::core::models::Stage;

/// Raised at startup; a process that hits one of these must not serve traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Upstream rejected credentials (status {0})")]
    Unauthorized(u16),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Credential rejections are never retried; everything else is worth another attempt.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Malformed(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transcript service rejected credentials: {0}")]
    Credentials(ClientError),
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Generation service returned an empty response")]
    EmptyResponse,

    #[error("Failed to access generation service: {0}")]
    Upstream(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Chat application '{0}' is not running")]
    HostAbsent(String),

    #[error("Keyboard automation failed: {0}")]
    Input(String),

    #[error("Clipboard copy failed: {0}")]
    Clipboard(String),

    #[error("Keystroke delivery is not available in this build")]
    Unsupported,
}

/// Stage-tagged failure that ends a request in `Stage::Failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("normalize stage: could not extract video ID from {0}")]
    InvalidVideoId(String),

    #[error("fetch stage: no transcript available for {0}")]
    TranscriptUnavailable(String),

    #[error("fetch stage: {0}")]
    Fetch(#[from] FetchError),

    #[error("summarize stage: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// The stage that was running when the request failed.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidVideoId(_) => Stage::Normalizing,
            PipelineError::TranscriptUnavailable(_) | PipelineError::Fetch(_) => Stage::Fetching,
            PipelineError::Summarize(_) => Stage::Summarizing,
            PipelineError::Internal(_) => Stage::Failed,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::InvalidVideoId(_) | PipelineError::TranscriptUnavailable(_) => 400,
            PipelineError::Fetch(_) | PipelineError::Summarize(_) | PipelineError::Internal(_) => {
                500
            }
        }
    }

    /// Message placed in the `error` field of the reply body.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidVideoId(_) => "Could not extract video ID",
            PipelineError::TranscriptUnavailable(_) => "자막을 추출할 수 없습니다.",
            PipelineError::Summarize(_) => "요약을 생성할 수 없습니다.",
            PipelineError::Fetch(_) | PipelineError::Internal(_) => "An internal error occurred",
        }
    }
}
