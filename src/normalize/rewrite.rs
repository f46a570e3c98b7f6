//! Field rewriter.
//!
//! Replaces every whole-field occurrence of a non-canonical alias with its
//! canonical field name. Matching happens on a case-folded copy of the input;
//! edits are collected as spans and applied back-to-front to a copy of the
//! untouched original, so no edit ever invalidates another edit's offsets.

use crate::knowledge::{fold_case, AliasTable};

/// Characters that may surround a standalone field reference.
const BOUNDARY: &[char] = &[
    ' ', ',', '(', ')', '=', '<', '>', '!', '*', '/', '+', '-', '\n', '\t',
];

/// Statement terminator, allowed only after a field.
const TERMINATOR: char = ';';

fn is_leading_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => BOUNDARY.contains(&c),
    }
}

fn is_trailing_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c == TERMINATOR || BOUNDARY.contains(&c),
    }
}

/// One alias occurrence scheduled for replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan<'a> {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    pub alias: &'a str,
    pub field: &'a str,
}

/// Collect every whole-field alias occurrence in `sql`.
///
/// Spans are returned in discovery order (alias table order, then offset).
pub fn find_spans<'a>(sql: &str, aliases: &'a AliasTable) -> Vec<MatchSpan<'a>> {
    let folded = fold_case(sql);
    let mut spans = Vec::new();

    for entry in aliases.rewrite_pairs() {
        let needle = entry.alias.as_str();
        if needle.is_empty() {
            continue;
        }

        let mut pos = 0;
        while let Some(offset) = folded[pos..].find(needle) {
            let start = pos + offset;
            let end = start + needle.len();

            let before = folded[..start].chars().next_back();
            let after = folded[end..].chars().next();
            if is_leading_boundary(before) && is_trailing_boundary(after) {
                spans.push(MatchSpan {
                    start,
                    end,
                    alias: needle,
                    field: entry.field.as_str(),
                });
            }

            pos = end;
        }
    }

    spans
}

fn is_all_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

fn is_all_lower(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}

/// Render `field` in the letter case of the text it replaces.
///
/// All-upper and all-lower originals carry over; anything else, including
/// text with no cased letters at all, gets the stored spelling.
pub fn match_case(original: &str, field: &str) -> String {
    if is_all_upper(original) {
        field.to_uppercase()
    } else if is_all_lower(original) {
        field.to_lowercase()
    } else {
        field.to_string()
    }
}

/// Apply `spans` to `sql`, last span first.
///
/// A span that overlaps one already applied is dropped.
pub fn apply_spans(sql: &str, mut spans: Vec<MatchSpan<'_>>) -> String {
    spans.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut out = sql.to_string();
    let mut floor = sql.len();
    for span in spans {
        if span.end > floor {
            tracing::trace!(alias = span.alias, start = span.start, "skipping overlapping span");
            continue;
        }
        let replacement = match_case(&sql[span.start..span.end], span.field);
        out.replace_range(span.start..span.end, &replacement);
        floor = span.start;
    }

    out
}

/// Rewrite every alias in `sql` to its canonical field.
pub fn rewrite(sql: &str, aliases: &AliasTable) -> String {
    if sql.is_empty() {
        return String::new();
    }
    let spans = find_spans(sql, aliases);
    if spans.is_empty() {
        return sql.to_string();
    }
    apply_spans(sql, spans)
}
