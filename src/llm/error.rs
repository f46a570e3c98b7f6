//! Language model error types.

use thiserror::Error;

use crate::config::SettingsError;

/// Result type for language model calls.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur while asking a model for SQL.
#[derive(Error, Debug)]
pub enum LlmError {
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

    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The model answered with nothing usable.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// A provider that needs an API key has none.
    #[error("no API key configured for {provider}; set llm.api_key or {env}")]
    MissingApiKey {
        provider: &'static str,
        env: &'static str,
    },

    /// Settings could not be resolved.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
