//! LLM (Gemini) API client module
//!
//! One `generateContent` call per prompt, no retry.

use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::errors::{ClientError, ConfigError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Rough token estimation - assume ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// LLM API client for generating summaries
pub struct LlmClient {
    api_key: String,
    model_name: String,
    base_url: String,
    http: Client,
}

impl LlmClient {
    pub fn new(api_key: String, model_name: String) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing("GEMINI_API_KEY"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self {
            api_key,
            model_name,
            base_url: GEMINI_BASE_URL.to_string(),
            http,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the generated text, possibly empty. Callers decide what empty means.
    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        #[cfg(feature = "debug-logs")]
        info!("Using Gemini prompt:\n{}", prompt);

        info!(
            model = %self.model_name,
            estimated_input_tokens = estimate_tokens(prompt),
            "Requesting generation"
        );

        let request_body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}],
                }
            ]
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(format!("Failed to parse Gemini response: {e}")))?;

        Ok(extract_text(&payload))
    }
}

/// Concatenate every text part of the first candidate.
#[must_use]
pub fn extract_text(payload: &Value) -> String {
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}
