//! # text2sql
//!
//! Natural-language stock screening queries to SQL against the
//! `stock_business` table.
//!
//! ## Architecture
//!
//! A language model drafts the SQL; a deterministic pipeline makes the draft
//! safe to run:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Natural-language query                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [knowledge::exemplar]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Exemplar match ──────► known-good SQL (done)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │ no match
//!                          ▼ [llm]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Candidate SQL (untrusted text)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [normalize::rewrite]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Canonical field names, case preserved          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [normalize::augment]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Every filtered field projected in SELECT          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [executor]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Downstream execution service                │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod executor;
pub mod knowledge;
pub mod llm;
pub mod normalize;
pub mod pipeline;

#[cfg(feature = "server")]
pub mod web;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::executor::{ExecutionResult, SqlExecutor};
    pub use crate::knowledge::{AliasTable, Exemplar, Knowledge};
    pub use crate::llm::{CandidateGenerator, LlmError, LlmResult};
    pub use crate::normalize::{augment, normalize_and_augment, rewrite};
    pub use crate::pipeline::{GeneratedSql, QueryOutcome, SqlPipeline, SqlSource};
}

pub use knowledge::Knowledge;
pub use normalize::normalize_and_augment;
pub use pipeline::SqlPipeline;
