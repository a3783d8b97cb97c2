use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::verify_password,
    token::TokenConfig,
    types::{AuthPayload, LoginRequest, MeResponse},
};
use crate::{shared::AppError, store::EventStore};

/// Service for login and identity lookups
pub struct SessionService {
    store: Arc<dyn EventStore>,
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(store: Arc<dyn EventStore>, token_config: TokenConfig) -> Self {
        Self {
            store,
            token_config,
        }
    }

    /// Checks the credentials and issues a token for the user
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthPayload, AppError> {
        let user = self
            .store
            .find_user_by_email(&request.email)
            .await?
            .filter(|user| verify_password(&request.password, &user.password_hash))
            .ok_or_else(|| {
                warn!("Login rejected");
                AppError::InvalidCredentials
            })?;

        let token = self.token_config.issue_token(&user.id)?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthPayload {
            token,
            user: user.summary(),
        })
    }

    /// Resolves a bearer token to a user id; `None` when absent or invalid
    pub fn resolve_user_id(&self, token: &str) -> Option<String> {
        self.token_config.resolve_user_id(token)
    }

    /// Extracts `Authorization: Bearer <token>` and resolves it
    pub fn user_id_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))?;

        self.resolve_user_id(token)
    }

    /// Returns the authenticated user and the events they attend
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Option<String>) -> Result<MeResponse, AppError> {
        let user_id = user_id.ok_or(AppError::NotAuthenticated)?;

        let user = self
            .store
            .find_user(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let events = self.store.find_events_by_attendee(&user.id).await?;

        Ok(MeResponse {
            user: user.summary(),
            events,
        })
    }
}
