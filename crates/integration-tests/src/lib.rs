//! Integration tests for the yarnshop API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and start the API
//! yarnshop migrate
//! cargo run -p yarnshop-api
//!
//! # Run integration tests
//! cargo test -p yarnshop-integration-tests -- --ignored
//! ```
//!
//! # Test Files
//!
//! - `api_health` - Liveness and readiness probes
//! - `api_products` - Catalog listing, search, sort and detail
//! - `api_auth` - Register, login and bearer tokens
//!
//! The API location is read from `YARNSHOP_API_URL`
//! (default `http://localhost:5004`).

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL of the API under test, without a trailing slash.
#[must_use]
pub fn base_url() -> String {
    std::env::var("YARNSHOP_API_URL")
        .map_or_else(|_| "http://localhost:5004".to_string(), |url| {
            url.trim_end_matches('/').to_string()
        })
}

/// A username that has not been registered yet.
#[must_use]
pub fn unique_username() -> String {
    format!("weaver-{}", uuid::Uuid::new_v4().simple())
}
