//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use yarnshop_core::query::{SortKey, apply_query};
use yarnshop_core::{Product, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

const NOT_FOUND_MESSAGE: &str = "Product not found";

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    pub sort: Option<String>,
}

impl ListQuery {
    fn sort_key(&self) -> Result<Option<SortKey>> {
        self.sort
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<SortKey>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let sort_key = query.sort_key()?;
    let products = ProductRepository::new(state.pool()).list().await?;

    if query.search.is_empty() && sort_key.is_none() {
        return Ok(Json(products));
    }

    let view = apply_query(&products, &query.search, sort_key)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(view))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
}
