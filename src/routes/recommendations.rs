use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{EnrichedRecord, RecommendationRequest},
    routes::AppState,
};

/// Handler for recommendations endpoint
///
/// An unknown title or a non-positive `k` is not an error: the response is
/// an empty list.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<EnrichedRecord>>> {
    let k = match request.k {
        None => state.default_k,
        Some(k) if k <= 0 => return Ok(Json(Vec::new())),
        Some(k) => usize::try_from(k).unwrap_or(usize::MAX),
    };

    if k > state.max_k {
        return Err(AppError::InvalidInput(format!(
            "k must be at most {}",
            state.max_k
        )));
    }

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        k,
        "Processing recommendation request"
    );

    let records = state.pipeline.get_recommendations(&request.title, k).await;

    Ok(Json(records))
}
