use std::sync::Arc;

use tubetldr::api::handler::function_handler;
use tubetldr::core::config::AppConfig;
use tubetldr::worker::build_orchestrator;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    tubetldr::setup_logging();

    let config = AppConfig::from_env()?;
    let orchestrator = Arc::new(build_orchestrator(&config)?);

    lambda_runtime::run(lambda_runtime::service_fn(move |event| {
        function_handler(Arc::clone(&orchestrator), event)
    }))
    .await
}
