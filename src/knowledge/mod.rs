//! Static domain knowledge.
//!
//! Everything the normalization pipeline reads but never mutates: the alias
//! table, the exemplar list, the storage schema and the indicator glossary.
//! A [`Knowledge`] value is built once at startup and shared read-only.
//!
//! ```text
//!   builtin tables ──┐
//!                    ├──► Knowledge ──► Arc<Knowledge> ──► pipeline / handlers
//!   knowledge.toml ──┘
//! ```

pub mod alias;
pub mod exemplar;
pub mod indicator;
pub mod loader;
pub mod schema;

use std::path::Path;

pub use alias::{fold_case, Alias, AliasTable};
pub use exemplar::{builtin_exemplars, match_exemplar, Exemplar, ExemplarMatch, DEFAULT_THRESHOLD};
pub use indicator::{IndicatorGlossary, UNKNOWN_INDICATOR};
pub use loader::{KnowledgeError, KnowledgeFile, KnowledgeResult};
pub use schema::{FieldGroup, SchemaField, StockSchema, STOCK_TABLE};

/// The read-only knowledge bundle.
#[derive(Debug, Clone)]
pub struct Knowledge {
    pub aliases: AliasTable,
    pub exemplars: Vec<Exemplar>,
    pub schema: StockSchema,
    pub indicators: IndicatorGlossary,
}

impl Default for Knowledge {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Knowledge {
    /// Built-in aliases, exemplars, schema and glossary.
    pub fn builtin() -> Self {
        Self {
            aliases: AliasTable::builtin(),
            exemplars: builtin_exemplars(),
            schema: StockSchema::builtin(),
            indicators: IndicatorGlossary::builtin(),
        }
    }

    /// Built-ins with no exemplars, so every query goes to the model.
    pub fn without_exemplars() -> Self {
        Self {
            exemplars: Vec::new(),
            ..Self::builtin()
        }
    }

    /// Built-ins extended by a knowledge file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnowledgeResult<Self> {
        let mut knowledge = Self::builtin();
        KnowledgeFile::from_file(path)?.apply(&mut knowledge)?;
        tracing::debug!(
            aliases = knowledge.aliases.len(),
            exemplars = knowledge.exemplars.len(),
            "loaded knowledge file"
        );
        Ok(knowledge)
    }

    /// Canonical fields the augmenter looks for in WHERE clauses.
    pub fn canonical_fields(&self) -> Vec<&str> {
        self.aliases.canonical_fields()
    }

    pub fn match_exemplar(&self, query: &str, threshold: f64) -> Option<ExemplarMatch<'_>> {
        match_exemplar(query, &self.exemplars, threshold)
    }
}
