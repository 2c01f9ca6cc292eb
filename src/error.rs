use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Cache operation timed out after {0:?}")]
    CacheTimeout(std::time::Duration),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Row {row} is out of range for a similarity matrix of size {size}")]
    OutOfRange { row: usize, size: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transient fetch error: {0}")]
    TransientFetch(String),

    #[error("Upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether retrying the same call may succeed.
    ///
    /// Timeouts, connection failures, non-2xx statuses and interrupted bodies
    /// are transient. A payload that fails to decode will not change on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::TransientFetch(_) | AppError::UpstreamStatus { .. } => true,
            AppError::HttpClient(e) => !e.is_decode() && !e.is_builder(),
            _ => false,
        }
    }

    /// HTTP status of a non-2xx upstream response, if that is what failed
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::OutOfRange { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Cache(_)
            | AppError::CacheTimeout(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::TransientFetch(msg) | AppError::MalformedResponse(msg) => {
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::HttpClient(_) | AppError::UpstreamStatus { .. } => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
