use serde::{Deserialize, Serialize};

use crate::store::{EventRecord, UserSummary};

/// JWT claims identifying the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request body for the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response structure for a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserSummary,
}

/// The authenticated user together with the events they attend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub events: Vec<EventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_use_user_id_key() {
        let claims = AuthClaims {
            user_id: "user-1".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));

        let deserialized: AuthClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_me_response_flattens_user() {
        let me = MeResponse {
            user: UserSummary {
                id: "u1".to_string(),
                name: "admin".to_string(),
                email: "admin@gmail.com".to_string(),
            },
            events: vec![],
        };

        let json = serde_json::to_value(&me).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["email"], "admin@gmail.com");
        assert!(json["events"].as_array().unwrap().is_empty());
    }
}
