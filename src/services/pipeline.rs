use crate::{
    models::{EnrichedRecord, RecordStatus},
    services::{metadata::MetadataResolver, recommendations::RecommendationEngine},
};
use std::time::Instant;

/// Title → ranked ids → enriched records.
///
/// The single entry point the HTTP layer (or any other front end) calls.
#[derive(Clone)]
pub struct RecommendationPipeline {
    engine: RecommendationEngine,
    resolver: MetadataResolver,
}

impl RecommendationPipeline {
    pub fn new(engine: RecommendationEngine, resolver: MetadataResolver) -> Self {
        Self { engine, resolver }
    }

    /// Enriched records for the `k` items most similar to `title`.
    ///
    /// Output order follows the similarity ranking. Items are resolved one at
    /// a time; an item whose metadata cannot be fetched keeps its slot with
    /// `status = failed`. An unknown title yields an empty list.
    pub async fn get_recommendations(&self, title: &str, k: usize) -> Vec<EnrichedRecord> {
        let start = Instant::now();

        let ids = self.engine.recommend(title, k);
        if ids.is_empty() {
            tracing::info!(title = %title, k, "No recommendations");
            return Vec::new();
        }

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.resolver.resolve(id).await);
        }

        let count = |status: RecordStatus| records.iter().filter(|r| r.status == status).count();
        tracing::info!(
            title = %title,
            k,
            returned = records.len(),
            ok = count(RecordStatus::Ok),
            partial = count(RecordStatus::Partial),
            failed = count(RecordStatus::Failed),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recommendations resolved"
        );

        records
    }
}
