use crate::{
    error::AppError,
    models::ExternalId,
    services::{catalog::CatalogIndex, similarity::SimilarityMatrix},
};
use std::sync::Arc;

/// A ranked peer of the selected title
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPeer {
    pub row_index: usize,
    pub external_id: ExternalId,
    pub score: f32,
}

/// Ranks catalog items by precomputed similarity to a selected title
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<CatalogIndex>,
    similarity: Arc<SimilarityMatrix>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<CatalogIndex>, similarity: Arc<SimilarityMatrix>) -> Self {
        Self {
            catalog,
            similarity,
        }
    }

    /// External ids of the `k` items most similar to `title`, best first.
    ///
    /// An unknown title (or a row the matrix does not cover) yields an empty list.
    pub fn recommend(&self, title: &str, k: usize) -> Vec<ExternalId> {
        self.rank(title, k)
            .into_iter()
            .map(|peer| peer.external_id)
            .collect()
    }

    /// Same as [`recommend`](Self::recommend) but keeps rows and scores
    pub fn rank(&self, title: &str, k: usize) -> Vec<RankedPeer> {
        if k == 0 {
            return Vec::new();
        }

        let row_index = match self.catalog.lookup_row(title) {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(title = %title, error = %e, "No recommendations for unknown title");
                return Vec::new();
            }
        };

        let scores = match self.similarity.scores_for(row_index) {
            Ok(scores) => scores,
            Err(e @ AppError::OutOfRange { .. }) => {
                tracing::warn!(title = %title, error = %e, "Catalog row missing from similarity matrix");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(title = %title, error = %e, "Similarity lookup failed");
                return Vec::new();
            }
        };

        let mut peers: Vec<(usize, f32)> = scores.collect();
        // Stable sort over row order: ties keep ascending row index
        peers.sort_by(|a, b| b.1.total_cmp(&a.1));

        peers
            .into_iter()
            .filter(|(peer_row, _)| *peer_row != row_index)
            .filter_map(|(peer_row, score)| {
                self.catalog.external_id(peer_row).map(|external_id| RankedPeer {
                    row_index: peer_row,
                    external_id,
                    score,
                })
            })
            .take(k)
            .collect()
    }
}
