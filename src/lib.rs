//! tubetldr - summarizes YouTube links posted in chat rooms.
//!
//! A chat message comes in, the first YouTube link in it is normalized, the
//! video's transcript is pulled through Apify actors, Gemini turns it into a
//! short Korean summary, and the summary goes back out through the configured
//! delivery channel.
//!
//! # Architecture
//!
//! One [`worker::Orchestrator`] owns the process-wide state (concurrency gate
//! and dedup ledger) and sits behind three thin transports:
//! - `tubetldr-server`: axum HTTP server (`POST /youtube`, `GET /health`)
//! - `tubetldr-lambda`: serverless function handler (feature `lambda`)
//! - `tubetldr-console`: stdin-driven desktop mode
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tubetldr::core::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     tubetldr::setup_console_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let orchestrator = Arc::new(tubetldr::worker::build_orchestrator(&config)?);
//!     tubetldr::api::server::serve(orchestrator, config.bind_addr).await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod prompt;
pub mod utils;
pub mod worker;

/// Configure structured logging with JSON format for serverless environments.
///
/// Safe to call more than once; later calls are no-ops.
///
/// # Example
///
/// ```
/// tubetldr::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Human-readable logging filtered by `RUST_LOG` (default `info`).
pub fn setup_console_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
