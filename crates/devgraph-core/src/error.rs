use chrono::{DateTime, Utc};
use thiserror::Error;

/// All the ways things can go wrong in devgraph
///
/// Storage failures never show up here for favorites operations - the
/// favorites store swallows them. `StorageError` is only surfaced when the
/// medium itself can't be opened.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] devgraph_storage::StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded{}", retry_hint(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn retry_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(". Try again after {}", at.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

impl From<devgraph_api::GitHubError> for Error {
    fn from(err: devgraph_api::GitHubError) -> Self {
        use devgraph_api::GitHubError;

        match err {
            GitHubError::RateLimited { reset_at } => Error::RateLimitExceeded { reset_at },
            GitHubError::NotFound(what) => Error::NotFound(what),
            other => Error::ApiError(other.to_string()),
        }
    }
}
