//! HTTP receiver for delivery webhooks.
//!
//! - `POST /webhooks` verifies the signature over the exact body, parses the
//!   events and records them
//! - `GET /events?limit=n` lists recently accepted events, newest first
//! - `GET /health` liveness probe

use crate::config::ReceiverConfig;
use crate::error::WebhookError;
use crate::headers;
use crate::store::EventStore;
use crate::verifier::WebhookVerifier;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

const DEFAULT_EVENTS_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    verifier: WebhookVerifier,
    store: Arc<RwLock<EventStore>>,
}

impl AppState {
    pub fn new(verifier: WebhookVerifier, history: usize) -> Self {
        Self {
            verifier,
            store: Arc::new(RwLock::new(EventStore::new(history))),
        }
    }

    pub fn from_config(config: &ReceiverConfig) -> Result<Self, WebhookError> {
        let verifier = WebhookVerifier::new(config.webhook_secret.clone())?;
        Ok(Self::new(verifier, config.recent_events))
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks", post(handle_webhook))
        .route("/events", get(list_events))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Bind and spawn the server. Returns the bound address (useful with port 0).
pub async fn start(
    config: &ReceiverConfig,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "webhook receiver listening");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "webhook receiver stopped");
        }
    });

    Ok((addr, handle))
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, WebhookError> {
    // Verification is over the exact received text; nothing is re-encoded.
    let payload = std::str::from_utf8(&body)
        .map_err(|_| WebhookError::Payload("Webhook payload must be UTF-8".into()))?;

    let signature = headers::extract_signature_from_header_map(&headers);
    let batch = state
        .verifier
        .process(signature.as_deref(), payload)
        .inspect_err(|e| tracing::warn!(error = %e, "webhook rejected"))?;

    let received = batch.events.len();
    let is_batch = batch.is_batch;
    let delivery_id = state.store.write().await.record_delivery(batch.events);
    tracing::info!(%delivery_id, received, is_batch, "webhook accepted");

    Ok(Json(json!({ "received": received, "batch": is_batch })))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_EVENTS_LIMIT);
    let store = state.store.read().await;
    let events = store.recent(limit);
    (
        StatusCode::OK,
        Json(json!({
            "events": events,
            "total_received": store.total_received(),
        })),
    )
}
