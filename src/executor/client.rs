//! HTTP client for the downstream SQL execution service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use super::error::{ExecutorError, ExecutorResult};
use super::{ExecutionResult, SqlExecutor};
use crate::config::ExecutorSettings;

/// Error body shape used by the execution service.
#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

/// Client for the execution service.
///
/// The service takes the raw SQL text as the request body, not a JSON
/// document, and answers with `{code, msg, data}`.
#[derive(Debug, Clone)]
pub struct ExecutorClient {
    http: Client,
    url: String,
}

impl ExecutorClient {
    pub fn from_settings(settings: &ExecutorSettings) -> ExecutorResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(ExecutorError::Client)?;

        Ok(Self {
            http,
            url: settings.resolved_url()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pick the most useful message out of an error response body.
pub(crate) fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { msg: Some(msg) }) if !msg.is_empty() => msg,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => "empty response".to_string(),
    }
}

#[async_trait]
impl SqlExecutor for ExecutorClient {
    async fn execute(&self, sql: &str) -> ExecutorResult<ExecutionResult> {
        let sql = sql.trim();
        tracing::info!(%sql, url = %self.url, "executing SQL");

        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(sql.as_bytes().to_vec())
            .send()
            .await
            .map_err(|source| ExecutorError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        response.json().await.map_err(ExecutorError::Decode)
    }
}
