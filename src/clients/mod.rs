//! Client modules for external API interactions

pub mod apify;
pub mod llm_client;

pub use apify::{ApifyClient, ScrapingService};
pub use llm_client::LlmClient;
