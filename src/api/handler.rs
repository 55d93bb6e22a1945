//! Serverless function handler.
//!
//! Translates an API-gateway style event into an [`IncomingMessage`], runs it
//! through the orchestrator, and returns `{statusCode, headers, body}`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{error, info};

use super::helpers::{self, EMPTY_BODY_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE, Reply};
use super::parsing;
use crate::core::models::IncomingMessage;
use crate::worker::Orchestrator;

/// Handle one serverless event. Always produces a response payload.
#[tracing::instrument(level = "info", skip_all)]
pub async fn handle_event(orchestrator: &Orchestrator, event: &Value) -> Value {
    if let Some(method) = parsing::request_method(event)
        && !method.eq_ignore_ascii_case("POST")
    {
        info!(method, "rejecting non-POST request");
        return helpers::to_lambda(&helpers::err_response(405, METHOD_NOT_ALLOWED_MESSAGE));
    }

    let message = match extract_message(event) {
        Ok(message) => message,
        Err(reply) => return helpers::to_lambda(&reply),
    };

    let outcome = orchestrator.handle(&message).await;
    helpers::to_lambda(&helpers::reply_for(&outcome))
}

fn extract_message(event: &Value) -> Result<IncomingMessage, Reply> {
    let Some(body) = event.get("body").and_then(Value::as_str) else {
        error!("Request missing body");
        return Err(helpers::err_response(400, EMPTY_BODY_MESSAGE));
    };

    let is_base64 = event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let bytes = if is_base64 {
        STANDARD.decode(body).map_err(|e| {
            error!("Failed to decode base64 body: {}", e);
            helpers::err_response(400, EMPTY_BODY_MESSAGE)
        })?
    } else {
        body.as_bytes().to_vec()
    };

    parsing::parse_message(&bytes).ok_or_else(|| {
        error!("Request body is not a JSON object");
        helpers::err_response(400, EMPTY_BODY_MESSAGE)
    })
}

#[cfg(feature = "lambda")]
pub use self::lambda_entry::function_handler;

#[cfg(feature = "lambda")]
mod lambda_entry {
    use lambda_runtime::{Error, LambdaEvent};
    use serde_json::Value;
    use std::sync::Arc;

    use crate::worker::Orchestrator;

    /// Lambda entrypoint; the orchestrator is built once per cold start.
    pub async fn function_handler(
        orchestrator: Arc<Orchestrator>,
        event: LambdaEvent<Value>,
    ) -> Result<Value, Error> {
        Ok(super::handle_event(&orchestrator, &event.payload).await)
    }
}
