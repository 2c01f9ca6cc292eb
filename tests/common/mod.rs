#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use moviematch_api::{build_state, config::Config, routes::AppState};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PLACEHOLDER: &str = "https://img.test/placeholder.png";
pub const IMAGE_BASE: &str = "https://img.test/w500";

/// Catalog {A, B, C, D} with external ids 100..=103
pub const CATALOG: &str = "movie_id,title\n100,A\n101,B\n102,C\n103,D\n";

/// Row for A is [1.0, 0.9, 0.1, 0.5]
pub const SIMILARITY: &str = "1.0,0.9,0.1,0.5\n0.9,1.0,0.2,0.4\n0.1,0.2,1.0,0.3\n0.5,0.4,0.3,1.0\n";

pub struct Artifacts {
    pub dir: TempDir,
    pub catalog: PathBuf,
    pub similarity: PathBuf,
}

pub fn write_artifacts(catalog: &str, similarity: &str) -> Artifacts {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("movies.csv");
    let similarity_path = dir.path().join("similarity.csv");
    std::fs::write(&catalog_path, catalog).unwrap();
    std::fs::write(&similarity_path, similarity).unwrap();
    Artifacts {
        dir,
        catalog: catalog_path,
        similarity: similarity_path,
    }
}

/// Config pointing at a mock TMDB server, with fast retries
pub fn test_config(api_url: &str, artifacts: &Artifacts, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("TMDB_API_KEY", "test-key"),
        ("IMAGE_BASE_URL", IMAGE_BASE),
        ("PLACEHOLDER_IMAGE_URL", PLACEHOLDER),
        ("MAX_RETRIES", "2"),
        ("RETRY_DELAY_MS", "10"),
        ("REQUEST_TIMEOUT_MS", "300"),
        ("RETRY_BUDGET_MS", "5000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    vars.insert("TMDB_API_URL".to_string(), api_url.to_string());
    vars.insert(
        "CATALOG_PATH".to_string(),
        artifacts.catalog.display().to_string(),
    );
    vars.insert(
        "SIMILARITY_PATH".to_string(),
        artifacts.similarity.display().to_string(),
    );
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_iter(vars).unwrap()
}

pub fn state(config: &Config) -> Arc<AppState> {
    let (state, cache_handle) = build_state(config).unwrap();
    assert!(cache_handle.is_none());
    state
}

pub fn details_body(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Movie {}", id),
        "poster_path": format!("/poster{}.jpg", id),
        "vote_average": 7.5,
        "release_date": "2010-07-16",
        "overview": format!("Plot of movie {}", id)
    })
}

pub fn credits_body(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "crew": [
            {"name": "Someone", "job": "Producer", "profile_path": null},
            {"name": format!("Director {}", id), "job": "Director", "profile_path": "/director.jpg"}
        ],
        "cast": [
            {"name": "Actor One", "profile_path": "/one.jpg"},
            {"name": "Actor Two", "profile_path": null},
            {"name": "Actor Three", "profile_path": "/three.jpg"},
            {"name": "Actor Four", "profile_path": "/four.jpg"}
        ]
    })
}

/// Mounts healthy details and credits endpoints for `id`
pub async fn mount_movie(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body(id)))
        .mount(server)
        .await;
    mount_credits(server, id).await;
}

pub async fn mount_credits(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}/credits", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(credits_body(id)))
        .mount(server)
        .await;
}
