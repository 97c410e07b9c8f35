use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),
    #[error("invalid stores file: {0}")]
    Validation(String),
}

/// Caller-supplied input that cannot be accepted. Always surfaced as a 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures reported by a [`crate::StoreRepository`] implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("store query timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] RepositoryError),
}
