//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Products
//! GET  /api/products           - Product listing (?search=&sort=)
//! GET  /api/products/{id}      - Product detail
//!
//! # Auth
//! POST /api/auth/register      - Create an account
//! POST /api/auth/login         - Exchange credentials for a bearer token
//! GET  /api/auth/me            - Current user (requires bearer token)
//!
//! # Stats
//! GET  /api/stats              - User and product totals
//! ```
//!
//! Unknown paths answer 404 with the usual JSON error body.

pub mod auth;
pub mod health;
pub mod products;
pub mod stats;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    if rate_limited {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the catalog routes router.
pub fn catalog_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/stats", get(stats::show));

    if rate_limited {
        router.layer(api_rate_limiter())
    } else {
        router
    }
}

/// Create all `/api` routes.
pub fn api_routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(rate_limited))
        .merge(catalog_routes(rate_limited))
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests stay free of a Sentry hub.
pub fn router(state: AppState) -> Router {
    let rate_limited = state.config().rate_limit;
    let cors = cors_layer(state.config().cors_origin.as_deref());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(rate_limited))
        .fallback(not_found)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
