//! HTTP surface: `GET /events` and `GET /health`.

use crate::bridge::SseBridge;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

/// Service name reported by the health probe
pub const SERVICE_NAME: &str = "slurm-stream-server";

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Build the router with CORS and request tracing
pub fn router(bridge: Arc<SseBridge>) -> Router {
    Router::new()
        .route("/events", get(events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .with_state(bridge)
}

async fn events(State(bridge): State<Arc<SseBridge>>, Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    let connection_id = Uuid::new_v4();
    let stream_name = query.get("stream").cloned().unwrap_or_default();
    let span = info_span!("sse", %connection_id, stream = %stream_name);

    let frames = bridge.frames(&query, bridge.connection_token(), span);
    let stream = frames.map(|frame| Ok::<Event, Infallible>(frame.into()));

    (
        AppendHeaders([(header::CONNECTION, "keep-alive")]),
        Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}
