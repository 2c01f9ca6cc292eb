pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::{Cache, CacheWriterHandle};
use error::AppResult;
use routes::AppState;
use services::{
    providers::TmdbProvider, ImageUrls, MetadataResolver, RecommendationEngine,
    RecommendationPipeline, RetryPolicy,
};

/// Loads the artifacts and wires the pipeline described by `config`.
///
/// Must run inside a Tokio runtime when `REDIS_URL` is set, since the cache
/// writer is spawned here. The returned handle flushes that writer.
pub fn build_state(config: &Config) -> AppResult<(Arc<AppState>, Option<CacheWriterHandle>)> {
    let (catalog, similarity) = db::load_artifacts(&config.catalog_path, &config.similarity_path)?;
    let catalog = Arc::new(catalog);
    let similarity = Arc::new(similarity);

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            let (cache, handle) = Cache::new(client, config.cache_timeout());
            tracing::info!("Metadata cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
        config.request_timeout(),
        cache,
    )?;

    let retry = RetryPolicy {
        max_retries: config.max_retries,
        delay: config.retry_delay(),
        attempt_timeout: config.request_timeout(),
        total_budget: config.retry_budget(),
    };

    let resolver = MetadataResolver::new(
        Arc::new(provider),
        retry,
        ImageUrls::new(&config.image_base_url, &config.placeholder_image_url),
    );

    let pipeline = RecommendationPipeline::new(
        RecommendationEngine::new(catalog.clone(), similarity),
        resolver,
    );

    let state = AppState {
        catalog,
        pipeline,
        default_k: config.default_k,
        max_k: config.max_k,
        loaded_at: chrono::Utc::now(),
    };

    Ok((Arc::new(state), cache_handle))
}
