//! Pipeline stages and the orchestrator that runs them

pub mod deliver;
pub mod keystroke;
pub mod orchestrator;
pub mod summarize;
pub mod transcript;

use std::sync::Arc;

use crate::clients::{ApifyClient, LlmClient};
use crate::core::config::AppConfig;
use crate::core::gate::Gate;
use crate::core::models::DeliveryMode;
use crate::errors::ConfigError;

pub use orchestrator::{Orchestrator, OrchestratorStatus};

use deliver::{ClipboardDelivery, Delivery, ResponseDelivery, SystemClipboard};
use keystroke::{KeystrokeDelivery, KeystrokeSettings, ProcessProbe, default_driver_factory};
use summarize::GeminiSummarizer;
use transcript::{FetchPlan, TranscriptFetcher};

/// Wire the production clients into an orchestrator. Fails on missing credentials.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, ConfigError> {
    let apify = ApifyClient::new(config.apify_api_token.clone())?;
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;

    let fetcher = TranscriptFetcher::new(Arc::new(apify), FetchPlan::from_config(config));
    let summarizer = GeminiSummarizer::new(llm);
    let delivery: Arc<dyn Delivery> = match config.delivery_mode {
        DeliveryMode::Response => Arc::new(ResponseDelivery),
        DeliveryMode::Keystroke => Arc::new(KeystrokeDelivery::new(
            KeystrokeSettings::from_config(config),
            Arc::new(ProcessProbe),
            default_driver_factory(),
        )),
        DeliveryMode::Clipboard => Arc::new(ClipboardDelivery::new(
            Arc::new(SystemClipboard),
            config.manual_pause,
        )),
    };

    Ok(Orchestrator::new(
        Gate::new(config.max_concurrent_requests),
        config.dedup_policy,
        Arc::new(fetcher),
        Arc::new(summarizer),
        delivery,
    ))
}
