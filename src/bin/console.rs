use std::sync::Arc;

use anyhow::Context;
use tubetldr::core::config::AppConfig;
use tubetldr::worker::build_orchestrator;
use tubetldr::worker::deliver::SystemClipboard;

const DEFAULT_ROOM: &str = "default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tubetldr::setup_console_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let orchestrator = Arc::new(build_orchestrator(&config)?);
    let room = config
        .console_room
        .clone()
        .unwrap_or_else(|| DEFAULT_ROOM.to_string());

    tubetldr::api::console::run_console(orchestrator, Arc::new(SystemClipboard), room)
        .await
        .context("console input failed")
}
