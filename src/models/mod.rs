use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;

pub mod tmdb;

pub use tmdb::{ApiCastMember, ApiCrewMember, ApiMovieCredits, ApiMovieDetails};

/// Fallback values substituted when the provider cannot supply a field
pub mod fallback {
    pub const TITLE: &str = "Unknown";
    pub const RATING: &str = "N/A";
    pub const RELEASE_DATE: &str = "Unknown";
    pub const PLOT: &str = "No plot available.";
    pub const DIRECTOR: &str = "Unknown";
}

/// Identifier used to query the metadata provider (a TMDB movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub u64);

impl Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub row_index: usize,
    pub external_id: ExternalId,
    pub title: String,
}

/// How much of a record came from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Ok,
    /// Some fields fell back because the provider could not supply them
    Partial,
    /// The provider produced nothing; every field is a fallback
    Failed,
}

/// Average vote, or unavailable. Serializes as a number or `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    Unavailable,
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::Unavailable => serializer.serialize_str(fallback::RATING),
        }
    }
}

/// A credited actor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastMember {
    pub name: String,
    pub image_url: String,
}

/// A recommendation resolved into displayable fields.
///
/// Every field always carries a value; missing data is replaced by the
/// constants in [`fallback`] or the configured placeholder image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub external_id: ExternalId,
    pub title: String,
    pub poster_url: String,
    pub rating: Rating,
    pub release_date: String,
    pub plot: String,
    pub director_name: String,
    pub director_image_url: String,
    pub cast: Vec<CastMember>,
    pub status: RecordStatus,
}

impl EnrichedRecord {
    /// Record for an item the provider could not resolve at all
    pub fn failed(external_id: ExternalId, placeholder_image_url: &str) -> Self {
        Self {
            external_id,
            title: fallback::TITLE.to_string(),
            poster_url: placeholder_image_url.to_string(),
            rating: Rating::Unavailable,
            release_date: fallback::RELEASE_DATE.to_string(),
            plot: fallback::PLOT.to_string(),
            director_name: fallback::DIRECTOR.to_string(),
            director_image_url: placeholder_image_url.to_string(),
            cast: Vec::new(),
            status: RecordStatus::Failed,
        }
    }
}

/// Request body for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    #[serde(default)]
    pub k: Option<i64>,
}
