use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::PipelineError;

/// Title used when neither the transcript nor the title lookup produced one.
pub const UNTITLED: &str = "제목 없음";

/// A chat message as posted by the messenger bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, rename = "msg")]
    pub text: String,
}

impl IncomingMessage {
    pub fn new(room: impl Into<String>, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: String,
    pub canonical_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Korean,
    English,
    Japanese,
    Default,
    Backup,
}

impl Language {
    /// Value passed as the `language` field of the primary actor's input.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Korean => "Korean",
            Language::English => "English",
            Language::Japanese => "Japanese",
            Language::Default => "Default",
            Language::Backup => "Backup",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "korean" | "ko" => Ok(Language::Korean),
            "english" | "en" => Ok(Language::English),
            "japanese" | "ja" => Ok(Language::Japanese),
            "default" => Ok(Language::Default),
            other => Err(format!("unsupported transcript language '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    pub text: String,
    pub language: Language,
    pub video_title: Option<String>,
}

/// When a video id enters the dedup ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    #[default]
    AfterSuccess,
    OnAttempt,
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "after_success" | "success" => Ok(DedupPolicy::AfterSuccess),
            "on_attempt" | "attempt" => Ok(DedupPolicy::OnAttempt),
            other => Err(format!("unknown dedup policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    #[default]
    Response,
    Keystroke,
    Clipboard,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "response" | "http" => Ok(DeliveryMode::Response),
            "keystroke" | "ui" => Ok(DeliveryMode::Keystroke),
            "clipboard" | "manual" => Ok(DeliveryMode::Clipboard),
            other => Err(format!("unknown delivery mode '{other}'")),
        }
    }
}

/// Request lifecycle. The last four variants are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Gated,
    Normalizing,
    Deduping,
    Fetching,
    Summarizing,
    Delivering,
    Done,
    Rejected,
    Skipped,
    Failed,
}

impl Stage {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stage::Done | Stage::Rejected | Stage::Skipped | Stage::Failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMessage,
    NotAYoutubeUrl,
    AlreadyProcessed,
}

impl SkipReason {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            SkipReason::NoMessage => "no_message",
            SkipReason::NotAYoutubeUrl => "not_a_youtube_url",
            SkipReason::AlreadyProcessed => "already_processed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub summary: String,
    pub video_title: String,
    pub language: Language,
    pub transcript_length: usize,
    /// Only present when a desktop delivery channel ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}

/// Result of one pass through the orchestrator.
#[derive(Debug)]
pub enum Outcome {
    Done(SummaryReport),
    Rejected,
    Skipped(SkipReason),
    Failed(PipelineError),
}

impl Outcome {
    /// Terminal stage reached by this request.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Outcome::Done(_) => Stage::Done,
            Outcome::Rejected => Stage::Rejected,
            Outcome::Skipped(_) => Stage::Skipped,
            Outcome::Failed(_) => Stage::Failed,
        }
    }
}
