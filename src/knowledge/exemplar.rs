//! Curated exemplar phrases with known-good SQL.
//!
//! A query that is close enough to an exemplar phrase skips the language
//! model entirely. "Close enough" is substring containment in either
//! direction, scored by the length ratio of the two normalized strings.

use serde::{Deserialize, Serialize};

/// Default score a match must strictly exceed.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// A trigger phrase and the SQL it stands for.
///
/// The SQL is stored already canonical and is returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    pub phrase: String,
    pub sql: String,
}

impl Exemplar {
    pub fn new(phrase: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            sql: sql.into(),
        }
    }
}

/// The built-in exemplar list.
pub fn builtin_exemplars() -> Vec<Exemplar> {
    vec![
        Exemplar::new(
            "KDJ金叉",
            "SELECT ts_code, stock_name, factor_kdj_k, factor_kdj_d FROM stock_business WHERE factor_kdj_k > factor_kdj_d AND factor_kdj_k<20 AND factor_kdj_d<20",
        ),
        Exemplar::new(
            "MACD金叉",
            "SELECT ts_code, stock_name, factor_macd_dif, factor_macd_dea FROM stock_business WHERE factor_macd_dif > factor_macd_dea",
        ),
        Exemplar::new(
            "量比大于2",
            "SELECT ts_code, stock_name, volume_ratio FROM stock_business WHERE volume_ratio > 2",
        ),
        Exemplar::new(
            "换手率大于 5%",
            "SELECT ts_code, stock_name, turnover_rate FROM stock_business WHERE turnover_rate > 5",
        ),
        Exemplar::new(
            "市盈率低于40%",
            "SELECT ts_code, stock_name, pe FROM stock_business WHERE pe < 40",
        ),
    ]
}

/// A successful exemplar match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExemplarMatch<'a> {
    /// Position of the exemplar in the list it was matched against.
    pub index: usize,
    pub score: f64,
    pub exemplar: &'a Exemplar,
}

impl<'a> ExemplarMatch<'a> {
    pub fn sql(&self) -> &'a str {
        &self.exemplar.sql
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase().trim().to_string()
}

/// Score `phrase` against `query`, both already normalized.
///
/// Returns `None` unless one contains the other. Lengths are counted in
/// characters.
pub fn containment_score(query: &str, phrase: &str) -> Option<f64> {
    if !(query.contains(phrase) || phrase.contains(query)) {
        return None;
    }
    let phrase_len = phrase.chars().count();
    let longest = query.chars().count().max(phrase_len);
    if longest == 0 {
        return None;
    }
    Some(phrase_len as f64 / longest as f64)
}

/// Find the best exemplar for `query`.
///
/// Only scores strictly above `threshold` qualify, and a later exemplar
/// replaces the current best only with a strictly higher score, so ties go
/// to the earlier index.
pub fn match_exemplar<'a>(
    query: &str,
    exemplars: &'a [Exemplar],
    threshold: f64,
) -> Option<ExemplarMatch<'a>> {
    let query = normalize(query);
    let mut best: Option<ExemplarMatch<'a>> = None;

    for (index, exemplar) in exemplars.iter().enumerate() {
        let phrase = normalize(&exemplar.phrase);
        let Some(score) = containment_score(&query, &phrase) else {
            continue;
        };
        let best_score = best.map(|b| b.score).unwrap_or(0.0);
        if score > best_score && score > threshold {
            best = Some(ExemplarMatch {
                index,
                score,
                exemplar,
            });
        }
    }

    best
}
