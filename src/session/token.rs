use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument, warn};

use super::types::AuthClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_hours: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// Issues a signed token identifying the user
    #[instrument(skip(self))]
    pub fn issue_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.expiration_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .and_then(|expires_at| usize::try_from(expires_at.timestamp()).ok())
            .ok_or_else(|| {
                warn!(
                    expiration_hours = self.expiration_hours,
                    "Token expiration out of range"
                );
                AppError::JwtError("token expiration out of range".to_string())
            })?;

        debug!(
            expiration_hours = self.expiration_hours,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AuthClaims {
            user_id: user_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            warn!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Resolves a token to the user id it was issued for
    ///
    /// Invalid or expired tokens resolve to `None`.
    #[instrument(skip(self, token))]
    pub fn resolve_user_id(&self, token: &str) -> Option<String> {
        match decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        ) {
            Ok(data) => {
                debug!(user_id = %data.claims.user_id, "JWT token decoded successfully");
                Some(data.claims.user_id)
            }
            Err(e) => {
                warn!(error = %e, "Invalid token");
                None
            }
        }
    }
}
