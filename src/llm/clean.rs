//! Cleanup of raw model output.
//!
//! Models asked for "bare SQL" still wrap answers in markdown fences or add
//! trailing comments. This strips those before the text reaches the rewriter.

use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\w*\n?").unwrap());

static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--[^\n]*(?:\n|$)").unwrap());

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Strip code fences, `--` comments and blank lines, then trim.
pub fn clean_sql(raw: &str) -> String {
    let sql = CODE_FENCE.replace_all(raw, "");
    let sql = LINE_COMMENT.replace_all(&sql, "");
    let sql = BLANK_LINES.replace_all(&sql, "\n");
    sql.trim().to_string()
}

/// Whether `text` plausibly contains a SELECT statement.
pub fn looks_like_select(text: &str) -> bool {
    text.to_lowercase().contains("select")
}
