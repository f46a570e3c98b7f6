//! End-to-end query handling.
//!
//! ```text
//!  query ──► exemplar match? ──yes──► exemplar SQL (verbatim)
//!               │ no
//!               ▼
//!          model candidate ──► clean ──► SELECT? ──no──► fallback SQL
//!                                          │ yes
//!                                          ▼
//!                               rewrite ──► augment ──► SQL
//! ```
//!
//! [`SqlPipeline::generate`] never fails: every collaborator failure ends in
//! the configured fallback query.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{Settings, SettingsError, DEFAULT_FALLBACK_SQL};
use crate::executor::{ExecutionResult, ExecutorClient, ExecutorError, SqlExecutor};
use crate::knowledge::{match_exemplar, Exemplar, Knowledge, KnowledgeError, DEFAULT_THRESHOLD};
use crate::llm::{clean_sql, looks_like_select, CandidateGenerator, LlmClient, LlmError};

/// Errors raised while assembling a pipeline from settings.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),

    #[error("executor client error: {0}")]
    Executor(#[from] ExecutorError),
}

/// Where a generated statement came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SqlSource {
    /// A curated exemplar; the SQL is returned verbatim.
    Exemplar { index: usize, phrase: String },
    /// The language model, after normalization.
    Llm,
    /// The fixed fallback query.
    Fallback { reason: String },
}

/// A generated statement and its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedSql {
    pub sql: String,
    pub source: SqlSource,
}

/// A generated statement plus what the execution service made of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub sql: String,
    pub source: SqlSource,
    pub result: ExecutionResult,
}

/// The query service.
///
/// Owns the read-only knowledge and the collaborator handles. Cheap to
/// clone and safe to share between request handlers.
#[derive(Clone)]
pub struct SqlPipeline {
    knowledge: Arc<Knowledge>,
    generator: Arc<dyn CandidateGenerator>,
    executor: Option<Arc<dyn SqlExecutor>>,
    schema_description: Arc<str>,
    threshold: f64,
    use_exemplars: bool,
    fallback_sql: String,
}

impl SqlPipeline {
    pub fn new(knowledge: Arc<Knowledge>, generator: Arc<dyn CandidateGenerator>) -> Self {
        let schema_description = knowledge.schema.describe().into();
        Self {
            knowledge,
            generator,
            executor: None,
            schema_description,
            threshold: DEFAULT_THRESHOLD,
            use_exemplars: true,
            fallback_sql: DEFAULT_FALLBACK_SQL.to_string(),
        }
    }

    /// Build the full service from settings: knowledge file, model client
    /// and execution client.
    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let knowledge = match settings.generator.knowledge_path()? {
            Some(path) => Knowledge::from_file(path)?,
            None => Knowledge::builtin(),
        };
        let generator = LlmClient::from_settings(&settings.llm)?;
        let executor = ExecutorClient::from_settings(&settings.executor)?;

        let mut pipeline = Self::new(Arc::new(knowledge), Arc::new(generator))
            .with_executor(Arc::new(executor))
            .with_threshold(settings.generator.exemplar_threshold)
            .with_fallback_sql(settings.generator.fallback_sql.clone());
        pipeline.use_exemplars = settings.generator.use_exemplars;
        Ok(pipeline)
    }

    pub fn with_executor(mut self, executor: Arc<dyn SqlExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_fallback_sql(mut self, sql: impl Into<String>) -> Self {
        self.fallback_sql = sql.into();
        self
    }

    /// Send every query to the model.
    pub fn without_exemplars(mut self) -> Self {
        self.use_exemplars = false;
        self
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn schema_description(&self) -> &str {
        &self.schema_description
    }

    fn exemplars(&self) -> &[Exemplar] {
        if self.use_exemplars {
            &self.knowledge.exemplars[..]
        } else {
            &[]
        }
    }

    fn fallback(&self, reason: impl Into<String>) -> GeneratedSql {
        let reason = reason.into();
        tracing::warn!(%reason, "using fallback query");
        GeneratedSql {
            sql: self.fallback_sql.clone(),
            source: SqlSource::Fallback { reason },
        }
    }

    /// Turn a natural-language query into SQL.
    pub async fn generate(&self, query: &str) -> GeneratedSql {
        let query = query.trim();

        if let Some(m) = match_exemplar(query, self.exemplars(), self.threshold) {
            tracing::info!(phrase = %m.exemplar.phrase, score = m.score, "exemplar matched");
            return GeneratedSql {
                sql: m.sql().to_string(),
                source: SqlSource::Exemplar {
                    index: m.index,
                    phrase: m.exemplar.phrase.clone(),
                },
            };
        }

        let candidate = match self
            .generator
            .generate_candidate(query, &self.schema_description)
            .await
        {
            Ok(candidate) => clean_sql(&candidate),
            Err(e) => return self.fallback(format!("model call failed: {}", e)),
        };

        if !looks_like_select(&candidate) {
            return self.fallback("model answer is not a SELECT statement");
        }

        let sql = self.knowledge.normalize(&candidate);
        tracing::info!(%candidate, %sql, "normalized model SQL");
        GeneratedSql {
            sql,
            source: SqlSource::Llm,
        }
    }

    /// Generate SQL and run it on the execution service.
    ///
    /// Execution failures are folded into the result envelope.
    pub async fn query(&self, query: &str) -> QueryOutcome {
        let GeneratedSql { sql, source } = self.generate(query).await;

        let result = match &self.executor {
            Some(executor) => ExecutionResult::from(executor.execute(&sql).await),
            None => ExecutionResult::failure("no execution service configured"),
        };
        if let Some(msg) = result.msg.as_deref().filter(|_| result.is_failure()) {
            tracing::warn!(%sql, %msg, "execution failed");
        }

        QueryOutcome {
            sql,
            source,
            result,
        }
    }
}
