use async_trait::async_trait;
use tracing::{info, warn};

use crate::clients::llm_client::LlmClient;
use crate::errors::SummarizeError;
use crate::prompt::build_summary_prompt;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str, title: &str) -> Result<String, SummarizeError>;
}

/// Summaries from Gemini, one call per request and no retry.
pub struct GeminiSummarizer {
    client: LlmClient,
}

impl GeminiSummarizer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, transcript: &str, title: &str) -> Result<String, SummarizeError> {
        let prompt = build_summary_prompt(title, transcript);
        let generated = self.client.generate(&prompt).await?;
        let summary = generated.trim();

        if summary.is_empty() {
            warn!(model = %self.client.model_name(), "generation returned no text");
            return Err(SummarizeError::EmptyResponse);
        }

        info!(chars = summary.chars().count(), "summary generated");
        Ok(summary.to_string())
    }
}
