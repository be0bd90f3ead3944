use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use tracing::debug;

use contracts::{DispatchOutcome, Event, MessageBroker};
use dispatcher::EventDispatcher;

use crate::error::ApiError;

// --- POST /events ---

pub(crate) async fn handle_events<B>(
    State(dispatcher): State<Arc<EventDispatcher<B>>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DispatchOutcome>, ApiError>
where
    B: MessageBroker + Send + Sync + 'static,
{
    // Decoded regardless of Content-Type
    let events = body
        .map_err(ApiError::from)
        .and_then(|bytes| Ok(serde_json::from_slice::<Vec<Event>>(&bytes)?))
        .inspect_err(|e| observability::record_request_rejected(e.reason()))?;

    debug!(events = events.len(), "Received event batch");
    Ok(Json(dispatcher.dispatch(events).await))
}

// --- GET /protected/health ---

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

pub(crate) async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().timestamp(),
    })
}
