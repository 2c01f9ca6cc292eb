//! TMDB (The Movie Database) metadata provider
//!
//! API Flow per movie:
//! 1. Details: /movie/{id} → title, poster path, rating, release date, overview
//! 2. Credits: /movie/{id}/credits → crew (director) and cast
//!
//! Both calls carry `api_key` and `language` query parameters.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiMovieCredits, ApiMovieDetails, ExternalId},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const CREDITS_CACHE_TTL: u64 = 86400; // 1 day
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    /// Creates a provider whose every HTTP call is bounded by `request_timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        request_timeout: Duration,
        cache: Option<Cache>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
        })
    }

    /// Single GET against the API, decoding the JSON body into `T`
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        // Errors are stripped of their URL so the api_key never reaches the logs
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message: format!("TMDB {}: {}", path, body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(path = %path, error = %e, response = %body, "Unexpected TMDB payload");
            AppError::MalformedResponse(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_details(&self, id: ExternalId) -> AppResult<ApiMovieDetails> {
        cached!(
            self.cache.as_ref(),
            CacheKey::MovieDetails {
                id,
                language: self.language.clone(),
            },
            DETAILS_CACHE_TTL,
            async move {
                let details: ApiMovieDetails = self.get_json(&format!("/movie/{}", id)).await?;

                tracing::debug!(
                    movie_id = %id,
                    provider = "tmdb",
                    "Movie details fetched"
                );

                Ok::<_, AppError>(details)
            }
        )
    }

    async fn fetch_credits(&self, id: ExternalId) -> AppResult<ApiMovieCredits> {
        cached!(
            self.cache.as_ref(),
            CacheKey::MovieCredits {
                id,
                language: self.language.clone(),
            },
            CREDITS_CACHE_TTL,
            async move {
                let credits: ApiMovieCredits =
                    self.get_json(&format!("/movie/{}/credits", id)).await?;

                tracing::debug!(
                    movie_id = %id,
                    crew = credits.crew.len(),
                    cast = credits.cast.len(),
                    provider = "tmdb",
                    "Movie credits fetched"
                );

                Ok::<_, AppError>(credits)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_provider(api_url: &str) -> TmdbProvider {
        TmdbProvider::new(
            "test_key".to_string(),
            api_url.to_string(),
            "en-US".to_string(),
            Duration::from_millis(500),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_details_sends_key_and_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/19995"))
            .and(query_param("api_key", "test_key"))
            .and(query_param("language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Avatar",
                "poster_path": "/avatar.jpg",
                "vote_average": 7.6,
                "release_date": "2009-12-15",
                "overview": "A marine on an alien planet."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let details = provider.fetch_details(ExternalId(19995)).await.unwrap();
        assert_eq!(details.title.as_deref(), Some("Avatar"));
        assert_eq!(details.vote_average, Some(7.6));
    }

    #[tokio::test]
    async fn test_fetch_credits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/19995/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 19995,
                "crew": [{"name": "James Cameron", "job": "Director", "profile_path": "/jc.jpg"}],
                "cast": [{"name": "Sam Worthington", "profile_path": "/sw.jpg"}]
            })))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let credits = provider.fetch_credits(ExternalId(19995)).await.unwrap();
        assert_eq!(credits.director().unwrap().name, "James Cameron");
        assert_eq!(credits.cast.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let err = provider.fetch_details(ExternalId(1)).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamStatus { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_rejected_key_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key."
            })))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let err = provider.fetch_details(ExternalId(1)).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(401));
        assert!(err.to_string().contains("Invalid API key"));
        assert!(!err.to_string().contains("test_key"));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cast": "nobody"})))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let err = provider.fetch_credits(ExternalId(1)).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"title": "Slow"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let err = provider.fetch_details(ExternalId(1)).await.unwrap_err();
        assert!(err.is_transient());
        assert!(!err.to_string().contains("test_key"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // Nothing listens on the discard port
        let provider = create_test_provider("http://127.0.0.1:9");
        let err = provider.fetch_details(ExternalId(1)).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = create_test_provider("https://api.themoviedb.org/3/");
        assert_eq!(provider.api_url, "https://api.themoviedb.org/3");
        assert_eq!(provider.name(), "tmdb");
    }
}
