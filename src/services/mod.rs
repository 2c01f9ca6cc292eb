pub mod catalog;
pub mod metadata;
pub mod pipeline;
pub mod providers;
pub mod recommendations;
pub mod retry;
pub mod similarity;
pub mod title_search;

pub use catalog::CatalogIndex;
pub use metadata::{ImageUrls, MetadataResolver};
pub use pipeline::RecommendationPipeline;
pub use recommendations::RecommendationEngine;
pub use retry::RetryPolicy;
pub use similarity::SimilarityMatrix;
