use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::{info, instrument};

use crate::shared::{AppError, AppState};
use crate::store::EventRecord;

/// HTTP handler for listing all events with their attendees
///
/// GET /events
#[instrument(name = "list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    let events = state.event_service.list_events().await?;
    info!(event_count = events.len(), "Events listed successfully");
    Ok(Json(events))
}

/// HTTP handler for a single event
///
/// GET /events/:id
#[instrument(name = "get_event", skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventRecord>, AppError> {
    let event = state.event_service.get_event(&event_id).await?;
    Ok(Json(event))
}

/// HTTP handler for joining an event
///
/// POST /events/:id/join with `Authorization: Bearer <token>`
/// Returns the updated event; connected clients are notified over WebSocket
#[instrument(name = "join_event", skip(state, headers))]
pub async fn join_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<EventRecord>, AppError> {
    let user_id = state.session_service.user_id_from_headers(&headers);
    let event = state.event_service.join_event(user_id, &event_id).await?;
    Ok(Json(event))
}
