use std::sync::Arc;

use anyhow::Context;
use tubetldr::core::config::AppConfig;
use tubetldr::worker::build_orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tubetldr::setup_console_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let orchestrator = Arc::new(build_orchestrator(&config)?);
    tracing::info!(
        max_concurrent = config.max_concurrent_requests,
        delivery = ?config.delivery_mode,
        "starting HTTP server"
    );

    tubetldr::api::server::serve(orchestrator, config.bind_addr)
        .await
        .with_context(|| format!("server on {} failed", config.bind_addr))
}
