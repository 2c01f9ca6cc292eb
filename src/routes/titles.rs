use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::CatalogItem,
    routes::AppState,
    services::title_search,
};

const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    title: String,
}

/// Every catalog title, in row order
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogItem>> {
    Json(state.catalog.items().to_vec())
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let titles = title_search::search_titles(&state.catalog, &params.q, limit)?;
    Ok(Json(titles.into_iter().cloned().collect()))
}

/// Resolves an exact title to its catalog row
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> AppResult<Json<CatalogItem>> {
    let row = state.catalog.lookup_row(&params.title)?;
    let item = state
        .catalog
        .get(row)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("Row {} vanished", row)))?;
    Ok(Json(item))
}
