use std::path::PathBuf;

use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

/// Body returned to chat clients whenever an answer could not be produced.
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure of one of the hosted services behind a query.
#[derive(Debug, Error)]
pub enum UpstreamServiceError {
    #[error("embedding service error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    #[error("llm service error: {0}")]
    Llm(String),
}

impl UpstreamServiceError {
    /// Metric label for the failing service.
    pub fn service(&self) -> &'static str {
        match self {
            UpstreamServiceError::Embedding(_) => "embedding",
            UpstreamServiceError::VectorStore(_) => "vector_store",
            UpstreamServiceError::Llm(_) => "llm",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamServiceError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Upstream and internal details stay in the logs.
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, GENERIC_FAILURE_MESSAGE.to_string()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        };

        (status, message).into_response()
    }
}
