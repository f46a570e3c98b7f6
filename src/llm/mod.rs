//! Language model collaborator.
//!
//! The model is a black box that turns a question plus a schema description
//! into candidate SQL text. Everything the rest of the crate needs from it is
//! the [`CandidateGenerator`] trait; [`LlmClient`] is the HTTP implementation.

mod client;
pub mod clean;
mod error;
pub mod prompt;

use async_trait::async_trait;

pub use clean::{clean_sql, looks_like_select};
pub use client::LlmClient;
pub use error::{LlmError, LlmResult};
pub use prompt::build_prompt;

/// Produces candidate SQL for a natural-language query.
///
/// Implementations return cleaned text; it is not guaranteed to be SQL.
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    async fn generate_candidate(&self, query: &str, schema: &str) -> LlmResult<String>;
}
