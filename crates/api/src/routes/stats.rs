//! Catalog statistics.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::{ProductRepository, UserRepository};
use crate::error::Result;
use crate::state::AppState;

/// Account and product totals.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub users: i64,
    pub products: i64,
}

/// `GET /api/stats`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<Stats>> {
    let users = UserRepository::new(state.pool());
    let products = ProductRepository::new(state.pool());
    let (users, products) = tokio::try_join!(users.count(), products.count())?;

    Ok(Json(Stats { users, products }))
}
