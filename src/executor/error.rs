//! Execution service error types.

use thiserror::Error;

use crate::config::SettingsError;

/// Result type for execution calls.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors that can occur while executing SQL downstream.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service rejected the statement.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Settings could not be resolved.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ExecutorError {
    /// The message shown to end users.
    ///
    /// For rejections this is the service's own message without the status.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
