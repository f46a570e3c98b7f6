//! Projection augmenter.
//!
//! Makes sure every canonical field a WHERE clause filters on is also in the
//! SELECT list. The clauses are located with bounded regular expressions, not
//! a parser; statements that look like more than a single-table filter are
//! left alone.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Substrings that mark a statement as too complex to augment.
pub const COMPLEXITY_MARKERS: &[&str] = &["join", "group by", "having", "union"];

static SELECT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\s+(.*?)\s+FROM\b").unwrap());

static WHERE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bWHERE\s+(.*?)(?:$|;|\s+ORDER\s+BY\b|\s+GROUP\s+BY\b|\s+HAVING\b|\s+LIMIT\b)")
        .unwrap()
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Whether `sql` contains any of [`COMPLEXITY_MARKERS`].
pub fn is_complex(sql: &str) -> bool {
    let lower = sql.to_lowercase();
    COMPLEXITY_MARKERS.iter().any(|m| lower.contains(m))
}

/// The text between `SELECT` and `FROM`, with its byte range.
pub fn select_list(sql: &str) -> Option<(std::ops::Range<usize>, &str)> {
    let m = SELECT_LIST.captures(sql)?.get(1)?;
    Some((m.range(), m.as_str()))
}

/// The WHERE clause body, up to the end, `;`, or the next trailing clause.
pub fn where_body(sql: &str) -> Option<&str> {
    Some(WHERE_BODY.captures(sql)?.get(1)?.as_str())
}

/// Canonical fields that occur as whole words in `body`, in `fields` order.
pub fn referenced_fields<'f, S: AsRef<str>>(body: &str, fields: &'f [S]) -> Vec<&'f str> {
    let words: HashSet<String> = WORD
        .find_iter(body)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    fields
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| words.contains(&f.to_lowercase()) && seen.insert(f.to_lowercase()))
        .collect()
}

/// Whether `field` is already covered by one of the projection entries.
///
/// An entry covers a field when it is the field itself, a qualified
/// `table.field`, an expression aliased `AS field`, or a bare `*`.
pub fn is_projected(field: &str, projection: &[&str]) -> bool {
    let field = field.to_lowercase();
    let qualified = format!(".{}", field);
    let aliased = format!(" as {}", field);

    projection.iter().any(|entry| {
        let entry = entry.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        entry == "*" || entry == field || entry.ends_with(&qualified) || entry.ends_with(&aliased)
    })
}

/// Append WHERE-clause fields missing from the SELECT list.
pub fn augment<S: AsRef<str>>(sql: &str, canonical_fields: &[S]) -> String {
    if is_complex(sql) {
        return sql.to_string();
    }

    let Some((range, list)) = select_list(sql) else {
        return sql.to_string();
    };
    let Some(body) = where_body(sql) else {
        return sql.to_string();
    };

    let projection: Vec<&str> = list.split(',').map(str::trim).collect();
    let missing: Vec<&str> = referenced_fields(body, canonical_fields)
        .into_iter()
        .filter(|f| !is_projected(f, &projection))
        .collect();

    if missing.is_empty() {
        return sql.to_string();
    }

    tracing::debug!(fields = ?missing, "adding filtered fields to projection");

    let mut out = String::with_capacity(sql.len() + missing.len() * 16);
    out.push_str(&sql[..range.end]);
    for field in &missing {
        out.push_str(", ");
        out.push_str(field);
    }
    out.push_str(&sql[range.end..]);
    out
}
