use axum::{extract::State, http::HeaderMap, Json};
use tracing::{info, instrument};

use super::types::{AuthPayload, LoginRequest, MeResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for logging in
///
/// POST /login
/// Returns a JWT token and the user's public fields
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthPayload>, AppError> {
    let payload = state.session_service.login(request).await?;
    Ok(Json(payload))
}

/// HTTP handler for the authenticated user's profile
///
/// GET /me with `Authorization: Bearer <token>`
#[instrument(name = "me", skip(state, headers))]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let user_id = state.session_service.user_id_from_headers(&headers);
    let me = state.session_service.me(user_id).await?;

    info!(user_id = %me.user.id, events = me.events.len(), "Profile fetched");
    Ok(Json(me))
}
