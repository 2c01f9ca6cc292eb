use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language sent with every metadata request
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Prefix for the relative image paths returned by TMDB
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Image used whenever the provider has no image path
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,

    /// Catalog artifact (CSV with `movie_id` and `title` columns)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Similarity matrix artifact (header-less square CSV)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Retries after the first attempt of a metadata lookup
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between lookup attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-call HTTP timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Wall-clock bound for one lookup, retries included
    #[serde(default = "default_retry_budget_ms")]
    pub retry_budget_ms: u64,

    /// Number of recommendations when the request does not say
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound on requested recommendations
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Redis connection URL; metadata caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Bound on each Redis round trip; a slower cache is bypassed
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/500x750?text=No+Image".to_string()
}

fn default_catalog_path() -> String {
    "data/movies.csv".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.csv".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_retry_budget_ms() -> u64 {
    15000
}

fn default_k() -> usize {
    5
}

fn default_max_k() -> usize {
    20
}

fn default_cache_timeout_ms() -> u64 {
    100
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb_api_key.trim().is_empty() {
            anyhow::bail!("TMDB_API_KEY must not be empty");
        }
        if self.default_k > self.max_k {
            anyhow::bail!(
                "DEFAULT_K ({}) must not exceed MAX_K ({})",
                self.default_k,
                self.max_k
            );
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_MS must be greater than zero");
        }
        if self.retry_budget_ms < self.request_timeout_ms {
            anyhow::bail!(
                "RETRY_BUDGET_MS ({}) must cover at least one request ({} ms)",
                self.retry_budget_ms,
                self.request_timeout_ms
            );
        }
        // A cache as slow as the request timeout would starve the provider call
        if self.cache_timeout_ms == 0 || self.cache_timeout_ms >= self.request_timeout_ms {
            anyhow::bail!(
                "CACHE_TIMEOUT_MS ({}) must be between 1 and REQUEST_TIMEOUT_MS ({})",
                self.cache_timeout_ms,
                self.request_timeout_ms
            );
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_budget(&self) -> Duration {
        Duration::from_millis(self.retry_budget_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}
