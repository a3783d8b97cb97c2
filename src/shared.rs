use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::events::EventService;
use crate::fanout::{BroadcastDispatcher, ConnectionRegistry};
use crate::session::{SessionService, TokenConfig};
use crate::store::EventStore;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Arc<BroadcastDispatcher>,
    pub event_service: Arc<EventService>,
    pub session_service: Arc<SessionService>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, token_config: TokenConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(Arc::clone(&registry)));
        let event_service = Arc::new(EventService::new(
            Arc::clone(&store),
            dispatcher.clone(),
        ));
        let session_service = Arc::new(SessionService::new(store, token_config));

        Self {
            registry,
            dispatcher,
            event_service,
            session_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::JwtError(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
