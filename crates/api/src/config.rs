//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `YARNSHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `YARNSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `YARNSHOP_PORT` - Listen port (default: 5004)
//! - `YARNSHOP_CORS_ORIGIN` - Allowed browser origin (default: any)
//! - `YARNSHOP_RATE_LIMIT` - Enable per-IP rate limiting (default: true)
//! - `YARNSHOP_TOKEN_TTL_HOURS` - Bearer token lifetime (default: 24)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: &str = "5004";
const DEFAULT_TOKEN_TTL_HOURS: &str = "24";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
    /// Whether per-IP rate limiting is applied
    pub rate_limit: bool,
    /// How long an issued bearer token stays valid
    pub token_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get_database_url(&lookup, "YARNSHOP_DATABASE_URL")?;
        let host = get_env_or_default(&lookup, "YARNSHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("YARNSHOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(&lookup, "YARNSHOP_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("YARNSHOP_PORT".to_string(), e.to_string()))?;
        let cors_origin = get_optional_env(&lookup, "YARNSHOP_CORS_ORIGIN");
        let rate_limit = parse_bool(
            "YARNSHOP_RATE_LIMIT",
            &get_env_or_default(&lookup, "YARNSHOP_RATE_LIMIT", "true"),
        )?;
        let ttl_hours = get_env_or_default(&lookup, "YARNSHOP_TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)
            .parse::<u64>()
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "YARNSHOP_TOKEN_TTL_HOURS".to_string(),
                    "must be a positive number of hours".to_string(),
                )
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin,
            rate_limit,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(
    lookup: &impl Fn(&str) -> Option<String>,
    primary_key: &str,
) -> Result<SecretString, ConfigError> {
    lookup(primary_key)
        .or_else(|| lookup("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got {other:?}"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("YARNSHOP_DATABASE_URL", "postgres://localhost/yarnshop")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5004");
        assert!(config.rate_limit);
        assert_eq!(config.token_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.sentry_dsn, None);
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");

        let config = load(&[
            ("YARNSHOP_DATABASE_URL", "postgres://primary/db"),
            ("DATABASE_URL", "postgres://fallback/db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://primary/db");
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "YARNSHOP_DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("YARNSHOP_DATABASE_URL", "postgres://localhost/yarnshop"),
            ("YARNSHOP_HOST", "0.0.0.0"),
            ("YARNSHOP_PORT", "8080"),
            ("YARNSHOP_RATE_LIMIT", "off"),
            ("YARNSHOP_TOKEN_TTL_HOURS", "2"),
            ("YARNSHOP_CORS_ORIGIN", "http://localhost:3000"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(!config.rate_limit);
        assert_eq!(config.token_ttl, Duration::from_secs(7200));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_invalid_values() {
        let base = ("YARNSHOP_DATABASE_URL", "postgres://localhost/yarnshop");
        assert!(load(&[base, ("YARNSHOP_PORT", "http")]).is_err());
        assert!(load(&[base, ("YARNSHOP_RATE_LIMIT", "maybe")]).is_err());
        assert!(load(&[base, ("YARNSHOP_TOKEN_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("YARNSHOP_DATABASE_URL", "postgres://user:hunter2@db/yarnshop")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
