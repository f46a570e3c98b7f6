//! SQL normalization and augmentation.
//!
//! Two total functions over plain SQL text, applied in order:
//!
//! ```text
//!  candidate SQL ──► rewrite (aliases → canonical fields)
//!                ──► augment (WHERE fields → SELECT list)
//!                ──► final SQL
//! ```
//!
//! Neither step fails. Input that cannot be understood comes back unchanged.

pub mod augment;
pub mod rewrite;

pub use augment::{augment, is_complex, COMPLEXITY_MARKERS};
pub use rewrite::{find_spans, match_case, rewrite, MatchSpan};

use crate::knowledge::{AliasTable, Knowledge};

/// `augment(rewrite(candidate))`.
pub fn normalize_and_augment<S: AsRef<str>>(
    candidate: &str,
    aliases: &AliasTable,
    canonical_fields: &[S],
) -> String {
    let rewritten = rewrite(candidate, aliases);
    augment(&rewritten, canonical_fields)
}

impl Knowledge {
    /// Normalize a candidate against this knowledge's alias table.
    pub fn normalize(&self, candidate: &str) -> String {
        normalize_and_augment(candidate, &self.aliases, &self.canonical_fields())
    }
}
