//! Technical indicator glossary.

/// Returned by [`IndicatorGlossary::explain`] when nothing is known.
pub const UNKNOWN_INDICATOR: &str = "没有找到该指标的解释";

const BUILTIN_INDICATORS: &[(&str, &str)] = &[
    (
        "KDJ金叉",
        "KDJ指标中，K线从下向上穿越D线，是一种买入信号。通常在K和D都低于20时更有效。",
    ),
    ("MACD金叉", "MACD指标中，DIF线从下向上穿越DEA线，是一种买入信号。"),
    (
        "量比",
        "量比是指当日成交量与过去一段时间平均成交量之比。量比大于1表示放量，小于1表示缩量。",
    ),
    ("换手率", "换手率是指一定时间内的成交量与流通股本之比，反映市场活跃度。"),
    ("市盈率", "市盈率是指股票价格与每股收益之比，反映股票的估值水平。"),
];

/// Indicator name to plain-language explanation.
#[derive(Debug, Clone, Default)]
pub struct IndicatorGlossary {
    entries: Vec<(String, String)>,
}

impl IndicatorGlossary {
    pub fn builtin() -> Self {
        let mut glossary = Self::default();
        for (name, text) in BUILTIN_INDICATORS {
            glossary.insert(*name, *text);
        }
        glossary
    }

    /// Add an explanation, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, explanation: impl Into<String>) {
        let name = name.into();
        let explanation = explanation.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = explanation,
            None => self.entries.push((name, explanation)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, e)| e.as_str())
    }

    /// Explanation for `name`, or [`UNKNOWN_INDICATOR`].
    pub fn explain(&self, name: &str) -> &str {
        self.get(name).unwrap_or(UNKNOWN_INDICATOR)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}
