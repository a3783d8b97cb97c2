use tracing::warn;

use crate::session::TokenConfig;

const DEFAULT_PORT: u16 = 8082;
const DEFAULT_TOKEN_EXPIRATION_HOURS: i64 = 24;
const MAX_TOKEN_EXPIRATION_HOURS: i64 = 24 * 365;
const DEV_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_expiration_hours: i64,
    pub seed_database: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing or unparsable values
    /// fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token_expiration_hours = match lookup("TOKEN_EXPIRATION_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if (1..=MAX_TOKEN_EXPIRATION_HOURS).contains(&hours) => hours,
                _ => {
                    warn!(
                        value = %raw,
                        max = MAX_TOKEN_EXPIRATION_HOURS,
                        "TOKEN_EXPIRATION_HOURS out of range, using default"
                    );
                    DEFAULT_TOKEN_EXPIRATION_HOURS
                }
            },
            None => DEFAULT_TOKEN_EXPIRATION_HOURS,
        };

        let seed_database = lookup("SEED_DATABASE")
            .map(|s| !matches!(s.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            port,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            jwt_secret,
            token_expiration_hours,
            seed_database,
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone(), self.token_expiration_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.port, 8082);
        assert_eq!(config.database_url, None);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_expiration_hours, 24);
        assert!(config.seed_database);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/rsvp"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_EXPIRATION_HOURS", "2"),
            ("SEED_DATABASE", "false"),
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/rsvp"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_expiration_hours, 2);
        assert!(!config.seed_database);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("DATABASE_URL", "")]);

        assert_eq!(config.port, 8082);
        assert_eq!(config.database_url, None);
    }

    #[rstest]
    #[case("9000000000000000")]
    #[case("-5")]
    #[case("0")]
    #[case("8761")]
    #[case("soon")]
    fn test_token_expiration_out_of_range_falls_back(#[case] raw: &str) {
        let config = config_from(&[("TOKEN_EXPIRATION_HOURS", raw)]);

        assert_eq!(config.token_expiration_hours, DEFAULT_TOKEN_EXPIRATION_HOURS);

        let tokens = config.token_config();
        let token = tokens.issue_token("u1").unwrap();
        assert_eq!(tokens.resolve_user_id(&token), Some("u1".to_string()));
    }

    #[test]
    fn test_token_expiration_upper_bound_is_accepted() {
        let config = config_from(&[("TOKEN_EXPIRATION_HOURS", "8760")]);
        assert_eq!(config.token_expiration_hours, 8760);
    }
}
