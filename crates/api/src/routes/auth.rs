//! Account route handlers: register, login and the current user.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Username and password, as posted to register and login.
#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn credentials(body: std::result::Result<Json<Credentials>, JsonRejection>) -> Result<Credentials> {
    body.map(|Json(c)| c)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let creds = credentials(body)?;

    AuthService::new(state.pool(), state.tokens())
        .register(&creds.username, &creds.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let creds = credentials(body)?;

    let token = AuthService::new(state.pool(), state.tokens())
        .login(&creds.username, &creds.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// `GET /api/auth/me`
pub async fn me(RequireUser(user): RequireUser) -> Json<CurrentUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "weaver".to_string(),
            password: "hunter2".to_string(),
        };
        let output = format!("{creds:?}");
        assert!(output.contains("weaver"));
        assert!(!output.contains("hunter2"));
    }
}
