//! Downstream SQL execution.
//!
//! Execution happens in a separate service. This module holds the result
//! envelope that service speaks, the [`SqlExecutor`] seam, and the HTTP
//! implementation.

mod client;
mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use client::ExecutorClient;
pub use error::{ExecutorError, ExecutorResult};

/// Status code used for failures reported to callers.
pub const FAILURE_CODE: i64 = -1;

/// Result envelope of the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(default)]
    pub data: Value,
}

impl ExecutionResult {
    /// The envelope returned to callers when execution fails.
    pub fn failure(reason: impl std::fmt::Display) -> Self {
        Self {
            code: FAILURE_CODE,
            msg: Some(format!("SQL execution failed: {}", reason)),
            data: Value::Array(Vec::new()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.code == FAILURE_CODE
    }

    /// Number of rows when `data` is an array.
    pub fn row_count(&self) -> Option<usize> {
        self.data.as_array().map(Vec::len)
    }
}

impl From<ExecutorResult<ExecutionResult>> for ExecutionResult {
    fn from(result: ExecutorResult<ExecutionResult>) -> Self {
        match result {
            Ok(result) => result,
            Err(e) => Self::failure(e.user_message()),
        }
    }
}

/// Executes SQL text somewhere else.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> ExecutorResult<ExecutionResult>;
}
