use serde::{Deserialize, Serialize};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw response from GET /movie/{id}
///
/// Every field is optional: TMDB omits or nulls fields for sparse entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMovieDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Raw response from GET /movie/{id}/credits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMovieCredits {
    #[serde(default)]
    pub crew: Vec<ApiCrewMember>,
    #[serde(default)]
    pub cast: Vec<ApiCastMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCastMember {
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl ApiMovieCredits {
    /// First crew entry credited as director, in provider order
    pub fn director(&self) -> Option<&ApiCrewMember> {
        self.crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
    }

    /// Leading cast entries, in the provider's billing order
    pub fn top_cast(&self, count: usize) -> &[ApiCastMember] {
        &self.cast[..self.cast.len().min(count)]
    }
}
