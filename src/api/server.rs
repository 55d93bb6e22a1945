//! Local HTTP transport (axum).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use super::helpers::{self, EMPTY_BODY_MESSAGE, Reply};
use super::parsing;
use crate::worker::Orchestrator;

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/youtube", post(youtube))
        .route("/health", get(health))
        .with_state(orchestrator)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(orchestrator: Arc<Orchestrator>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("tubetldr listening on http://{}", addr);
    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn youtube(State(orchestrator): State<Arc<Orchestrator>>, body: Bytes) -> Response {
    let reply = match parsing::parse_message(&body) {
        Some(message) => helpers::reply_for(&orchestrator.handle(&message).await),
        None => helpers::err_response(400, EMPTY_BODY_MESSAGE),
    };
    into_response(reply)
}

async fn health(State(orchestrator): State<Arc<Orchestrator>>) -> Json<Value> {
    let status = orchestrator.status();
    Json(json!({
        "ok": true,
        "processed": status.processed,
        "in_flight": status.in_flight,
    }))
}

fn into_response(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}
