//! Metadata provider abstraction
//!
//! The resolver only depends on this trait, so the upstream catalog service
//! can be swapped (or mocked in tests) without touching retry and fallback
//! policy. Implementations perform exactly one attempt per call; retries are
//! the caller's concern.

use crate::{
    error::AppResult,
    models::{ApiMovieCredits, ApiMovieDetails, ExternalId},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch descriptive fields (title, poster path, rating, release date, synopsis)
    async fn fetch_details(&self, id: ExternalId) -> AppResult<ApiMovieDetails>;

    /// Fetch crew and cast
    async fn fetch_credits(&self, id: ExternalId) -> AppResult<ApiMovieCredits>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
