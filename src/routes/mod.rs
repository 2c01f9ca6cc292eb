use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{CatalogIndex, RecommendationPipeline},
};

pub mod recommendations;
pub mod titles;

/// Shared, read-only application state
pub struct AppState {
    pub catalog: Arc<CatalogIndex>,
    pub pipeline: RecommendationPipeline,
    pub default_k: usize,
    pub max_k: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        // Outermost first: the request id exists before the trace span is made
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/titles/search", get(titles::search))
        .route("/titles/lookup", get(titles::lookup))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "items": state.catalog.len(),
        "loaded_at": state.loaded_at.to_rfc3339(),
    }))
}
