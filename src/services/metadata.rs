use crate::{
    models::{
        fallback, ApiMovieCredits, ApiMovieDetails, CastMember, EnrichedRecord, ExternalId,
        Rating, RecordStatus,
    },
    services::{providers::MetadataProvider, retry::RetryPolicy},
};
use std::sync::Arc;

const CAST_LIMIT: usize = 3;

/// Builds absolute image URLs from the provider's relative paths
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUrls {
    pub base_url: String,
    pub placeholder_url: String,
}

impl ImageUrls {
    pub fn new(base_url: impl Into<String>, placeholder_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            placeholder_url: placeholder_url.into(),
        }
    }

    /// `base + path`, or the placeholder when the path is missing or blank
    pub fn url(&self, path: Option<&str>) -> String {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p.starts_with('/') => format!("{}{}", self.base_url, p),
            Some(p) => format!("{}/{}", self.base_url, p),
            None => self.placeholder_url.clone(),
        }
    }
}

/// Resolves external ids into fully populated records.
///
/// Never fails: provider errors degrade the record to `partial` or `failed`
/// with fallback values in place of the missing fields.
#[derive(Clone)]
pub struct MetadataResolver {
    provider: Arc<dyn MetadataProvider>,
    retry: RetryPolicy,
    images: ImageUrls,
}

impl MetadataResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, retry: RetryPolicy, images: ImageUrls) -> Self {
        Self {
            provider,
            retry,
            images,
        }
    }

    pub async fn resolve(&self, id: ExternalId) -> EnrichedRecord {
        let provider = self.provider.as_ref();
        let (details, credits) = tokio::join!(
            self.retry
                .run("movie details", move || provider.fetch_details(id)),
            self.retry
                .run("movie credits", move || provider.fetch_credits(id))
        );

        let details = match details {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    movie_id = %id,
                    provider = provider.name(),
                    error = %e,
                    "Details lookup failed, returning fallback record"
                );
                return EnrichedRecord::failed(id, &self.images.placeholder_url);
            }
        };

        let credits = match credits {
            Ok(credits) => Some(credits),
            Err(e) => {
                tracing::warn!(
                    movie_id = %id,
                    provider = provider.name(),
                    error = %e,
                    "Credits lookup failed, returning partial record"
                );
                None
            }
        };

        self.build_record(id, details, credits)
    }

    fn build_record(
        &self,
        id: ExternalId,
        details: ApiMovieDetails,
        credits: Option<ApiMovieCredits>,
    ) -> EnrichedRecord {
        let mut complete = credits.is_some();
        let mut or_fallback = |value: Option<String>, default: &str| -> String {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    complete = false;
                    default.to_string()
                }
            }
        };

        let title = or_fallback(details.title, fallback::TITLE);
        let release_date = or_fallback(details.release_date, fallback::RELEASE_DATE);
        let plot = or_fallback(details.overview, fallback::PLOT);

        let rating = match details.vote_average {
            Some(score) if score.is_finite() => Rating::Score(score),
            _ => {
                complete = false;
                Rating::Unavailable
            }
        };

        let has_poster = details
            .poster_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_poster {
            complete = false;
        }
        let poster_url = self.images.url(details.poster_path.as_deref());

        let (director_name, director_image_url, cast) = match &credits {
            Some(credits) => {
                let director = credits.director();
                let cast = credits
                    .top_cast(CAST_LIMIT)
                    .iter()
                    .map(|member| CastMember {
                        name: member.name.clone(),
                        image_url: self.images.url(member.profile_path.as_deref()),
                    })
                    .collect();
                (
                    director
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| fallback::DIRECTOR.to_string()),
                    self.images
                        .url(director.and_then(|d| d.profile_path.as_deref())),
                    cast,
                )
            }
            None => (
                fallback::DIRECTOR.to_string(),
                self.images.placeholder_url.clone(),
                Vec::new(),
            ),
        };

        EnrichedRecord {
            external_id: id,
            title,
            poster_url,
            rating,
            release_date,
            plot,
            director_name,
            director_image_url,
            cast,
            status: if complete {
                RecordStatus::Ok
            } else {
                RecordStatus::Partial
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{ApiCastMember, ApiCrewMember},
        services::providers::MockMetadataProvider,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const BASE: &str = "https://image.tmdb.org/t/p/w500";
    const PLACEHOLDER: &str = "https://img.local/none.png";

    fn images() -> ImageUrls {
        ImageUrls::new(BASE, PLACEHOLDER)
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(1),
            attempt_timeout: Duration::from_millis(200),
            total_budget: Duration::from_secs(2),
        }
    }

    fn resolver(provider: MockMetadataProvider, max_retries: u32) -> MetadataResolver {
        MetadataResolver::new(Arc::new(provider), fast_retry(max_retries), images())
    }

    fn avatar_details() -> ApiMovieDetails {
        ApiMovieDetails {
            title: Some("Avatar".to_string()),
            poster_path: Some("/avatar.jpg".to_string()),
            vote_average: Some(7.2),
            release_date: Some("2009-12-10".to_string()),
            overview: Some("In the 22nd century, a paraplegic Marine...".to_string()),
        }
    }

    fn avatar_credits() -> ApiMovieCredits {
        ApiMovieCredits {
            crew: vec![
                ApiCrewMember {
                    name: "Jon Landau".to_string(),
                    job: Some("Producer".to_string()),
                    profile_path: None,
                },
                ApiCrewMember {
                    name: "James Cameron".to_string(),
                    job: Some("Director".to_string()),
                    profile_path: Some("/cameron.jpg".to_string()),
                },
            ],
            cast: ["Sam Worthington", "Zoe Saldana", "Sigourney Weaver", "Stephen Lang"]
                .iter()
                .map(|name| ApiCastMember {
                    name: name.to_string(),
                    profile_path: if *name == "Zoe Saldana" {
                        None
                    } else {
                        Some(format!("/{}.jpg", name.split(' ').next().unwrap().to_lowercase()))
                    },
                })
                .collect(),
        }
    }

    fn provider_with(
        details: fn() -> Result<ApiMovieDetails, AppError>,
        credits: fn() -> Result<ApiMovieCredits, AppError>,
    ) -> MockMetadataProvider {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_details().returning(move |_| details());
        provider.expect_fetch_credits().returning(move |_| credits());
        provider.expect_name().return_const("mock");
        provider
    }

    #[test]
    fn test_image_url_building() {
        let images = images();
        assert_eq!(images.url(Some("/a.jpg")), format!("{}/a.jpg", BASE));
        assert_eq!(images.url(Some("a.jpg")), format!("{}/a.jpg", BASE));
        assert_eq!(images.url(Some("")), PLACEHOLDER);
        assert_eq!(images.url(None), PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_resolve_full_record() {
        let resolver = resolver(provider_with(|| Ok(avatar_details()), || Ok(avatar_credits())), 2);
        let record = resolver.resolve(ExternalId(19995)).await;

        assert_eq!(record.status, RecordStatus::Ok);
        assert_eq!(record.external_id, ExternalId(19995));
        assert_eq!(record.title, "Avatar");
        assert_eq!(record.poster_url, format!("{}/avatar.jpg", BASE));
        assert_eq!(record.rating, Rating::Score(7.2));
        assert_eq!(record.release_date, "2009-12-10");
        assert_eq!(record.director_name, "James Cameron");
        assert_eq!(record.director_image_url, format!("{}/cameron.jpg", BASE));

        let names: Vec<&str> = record.cast.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sam Worthington", "Zoe Saldana", "Sigourney Weaver"]);
        assert_eq!(record.cast[0].image_url, format!("{}/sam.jpg", BASE));
        assert_eq!(record.cast[1].image_url, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_provider_always_failing_yields_failed_record() {
        let resolver = resolver(
            provider_with(
                || Err(AppError::TransientFetch("connection reset".to_string())),
                || Err(AppError::TransientFetch("connection reset".to_string())),
            ),
            2,
        );
        let record = resolver.resolve(ExternalId(7)).await;

        assert_eq!(record, EnrichedRecord::failed(ExternalId(7), PLACEHOLDER));
        assert_eq!(record.title, "Unknown");
        assert_eq!(record.rating, Rating::Unavailable);
        assert_eq!(record.release_date, "Unknown");
        assert_eq!(record.plot, "No plot available.");
        assert_eq!(record.poster_url, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_credits_failure_yields_partial_record() {
        let resolver = resolver(
            provider_with(
                || Ok(avatar_details()),
                || Err(AppError::TransientFetch("503".to_string())),
            ),
            1,
        );
        let record = resolver.resolve(ExternalId(19995)).await;

        assert_eq!(record.status, RecordStatus::Partial);
        assert_eq!(record.title, "Avatar");
        assert_eq!(record.director_name, "Unknown");
        assert_eq!(record.director_image_url, PLACEHOLDER);
        assert!(record.cast.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_details_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_details().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::MalformedResponse("expected object".to_string()))
        });
        provider
            .expect_fetch_credits()
            .returning(|_| Ok(avatar_credits()));
        provider.expect_name().return_const("mock");

        let record = resolver(provider, 3).resolve(ExternalId(1)).await;
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_then_succeed() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_details().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::TransientFetch("timed out".to_string()))
            } else {
                Ok(avatar_details())
            }
        });
        provider
            .expect_fetch_credits()
            .returning(|_| Ok(avatar_credits()));
        provider.expect_name().return_const("mock");

        let record = resolver(provider, 2).resolve(ExternalId(19995)).await;
        assert_eq!(record.status, RecordStatus::Ok);
        assert_eq!(record.title, "Avatar");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_missing_director_and_short_cast() {
        let resolver = resolver(
            provider_with(
                || Ok(avatar_details()),
                || {
                    Ok(ApiMovieCredits {
                        crew: vec![],
                        cast: vec![ApiCastMember {
                            name: "Solo Actor".to_string(),
                            profile_path: None,
                        }],
                    })
                },
            ),
            0,
        );
        let record = resolver.resolve(ExternalId(3)).await;

        assert_eq!(record.status, RecordStatus::Ok);
        assert_eq!(record.director_name, "Unknown");
        assert_eq!(record.director_image_url, PLACEHOLDER);
        assert_eq!(record.cast.len(), 1);
    }

    #[tokio::test]
    async fn test_sparse_details_are_partial_with_fallbacks() {
        let resolver = resolver(
            provider_with(
                || {
                    Ok(ApiMovieDetails {
                        title: Some("Obscure".to_string()),
                        poster_path: None,
                        vote_average: None,
                        release_date: Some(String::new()),
                        overview: Some("   ".to_string()),
                    })
                },
                || Ok(ApiMovieCredits::default()),
            ),
            0,
        );
        let record = resolver.resolve(ExternalId(4)).await;

        assert_eq!(record.status, RecordStatus::Partial);
        assert_eq!(record.title, "Obscure");
        assert_eq!(record.poster_url, PLACEHOLDER);
        assert_eq!(record.rating, Rating::Unavailable);
        assert_eq!(record.release_date, "Unknown");
        assert_eq!(record.plot, "No plot available.");
    }
}
