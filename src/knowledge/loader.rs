//! TOML knowledge file.
//!
//! Extends the built-in knowledge with site-specific aliases, exemplars and
//! indicator explanations:
//!
//! ```toml
//! [aliases]
//! "收盘" = "daily_close"
//!
//! [[exemplars]]
//! phrase = "RSI超卖"
//! sql = "SELECT ts_code, stock_name, factor_rsi_6 FROM stock_business WHERE factor_rsi_6 < 20"
//!
//! [indicators]
//! "RSI" = "相对强弱指标，低于20通常视为超卖。"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::exemplar::Exemplar;
use super::Knowledge;

/// Errors raised while loading a knowledge file.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Knowledge file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read knowledge file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse knowledge file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Alias '{alias}' targets unknown field '{field}'")]
    UnknownField { alias: String, field: String },

    #[error("Alias '{alias}' is itself the field '{alias}' and cannot target '{field}'")]
    AliasShadowsField { alias: String, field: String },

    #[error("Exemplar #{0} has an empty phrase or SQL")]
    EmptyExemplar(usize),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

/// On-disk shape of a knowledge file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeFile {
    pub aliases: BTreeMap<String, String>,
    pub exemplars: Vec<Exemplar>,
    pub indicators: BTreeMap<String, String>,
}

impl KnowledgeFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnowledgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KnowledgeError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> KnowledgeResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge into `knowledge`.
    ///
    /// Aliases must target a schema field and override built-ins with the
    /// same spelling. A field name may only alias itself, otherwise a second
    /// rewrite would move it again. Exemplars are appended. Indicators override by name.
    /// Nothing is applied if any entry is invalid.
    pub fn apply(self, knowledge: &mut Knowledge) -> KnowledgeResult<()> {
        for (alias, field) in &self.aliases {
            let Some(target) = knowledge.schema.get(field) else {
                return Err(KnowledgeError::UnknownField {
                    alias: alias.clone(),
                    field: field.clone(),
                });
            };
            if let Some(shadowed) = knowledge.schema.get(alias.trim()) {
                if shadowed.name != target.name {
                    return Err(KnowledgeError::AliasShadowsField {
                        alias: alias.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        for (i, exemplar) in self.exemplars.iter().enumerate() {
            if exemplar.phrase.trim().is_empty() || exemplar.sql.trim().is_empty() {
                return Err(KnowledgeError::EmptyExemplar(i));
            }
        }

        for (alias, field) in self.aliases {
            // Store the schema's spelling, not whatever case the file used.
            let canonical = knowledge
                .schema
                .get(&field)
                .map(|f| f.name.to_string())
                .unwrap_or(field);
            knowledge.aliases.insert(alias, canonical);
        }
        knowledge.exemplars.extend(self.exemplars);
        for (name, text) in self.indicators {
            knowledge.indicators.insert(name, text);
        }

        Ok(())
    }
}
