use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComponentsError>;

#[derive(Error, Debug)]
pub enum ComponentsError {
    #[error("API key is required: set {env}")]
    MissingApiKey { env: &'static str },
    #[error("Task ID must be a non-empty string")]
    EmptyTaskId,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("API error (status {status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("{vendor} error: {message}")]
    Vendor {
        vendor: &'static str,
        code: Option<i64>,
        message: String,
    },
    #[error("Vendor response did not include a task ID")]
    MissingTaskId,
    #[error("Vendor response did not include task data")]
    MissingTaskData,
    #[error("{operation} not supported by {vendor}")]
    Unsupported {
        operation: &'static str,
        vendor: &'static str,
    },
    #[error("Task did not reach a terminal state within {0:?}")]
    Timeout(Duration),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl ComponentsError {
    /// True for the capability-gap error returned by vendors lacking cancel or list.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ComponentsError::Unsupported { .. })
    }

    pub(crate) fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        ComponentsError::Storage(format!("{context}: {err}"))
    }
}
