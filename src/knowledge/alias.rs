//! Field alias table.
//!
//! Maps every user-facing spelling of a field (English mnemonic, Chinese
//! label, bare indicator name) to exactly one canonical storage field.
//! Keys are matched case-insensitively; values keep the stored spelling.

use std::collections::HashMap;

/// Built-in aliases, grouped the same way as the schema catalog.
///
/// Identity entries are kept so the table doubles as a list of every field a
/// user may name; they never trigger a rewrite.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    // Basic
    ("ts_code", "ts_code"),
    ("stock_name", "stock_name"),
    ("股票代码", "ts_code"),
    ("股票名称", "stock_name"),
    ("trade_date", "trade_date"),
    ("交易日期", "trade_date"),
    ("daily_close", "daily_close"),
    ("收盘价", "daily_close"),
    // Turnover
    ("turnover_rate", "turnover_rate"),
    ("turnover_rate_f", "turnover_rate_f"),
    ("换手率", "turnover_rate"),
    ("自由流通股换手率", "turnover_rate_f"),
    // Volume ratio
    ("volume_ratio", "volume_ratio"),
    ("量比", "volume_ratio"),
    // P/E
    ("pe", "pe"),
    ("pe_ttm", "pe_ttm"),
    ("市盈率", "pe"),
    ("市盈率ttm", "pe_ttm"),
    // P/B
    ("pb", "pb"),
    ("市净率", "pb"),
    // P/S
    ("ps", "ps"),
    ("ps_ttm", "ps_ttm"),
    ("市销率", "ps"),
    ("市销率ttm", "ps_ttm"),
    // Dividend yield
    ("dv_ratio", "dv_ratio"),
    ("dv_ttm", "dv_ttm"),
    ("股息率", "dv_ratio"),
    ("股息率ttm", "dv_ttm"),
    // Share capital
    ("total_share", "total_share"),
    ("float_share", "float_share"),
    ("free_share", "free_share"),
    ("总股本", "total_share"),
    ("流通股本", "float_share"),
    ("自由流通股本", "free_share"),
    // Market cap
    ("total_mv", "total_mv"),
    ("circ_mv", "circ_mv"),
    ("总市值", "total_mv"),
    ("流通市值", "circ_mv"),
    // Prices
    ("factor_open", "factor_open"),
    ("factor_high", "factor_high"),
    ("factor_low", "factor_low"),
    ("factor_pre_close", "factor_pre_close"),
    ("factor_change", "factor_change"),
    ("factor_pct_change", "factor_pct_change"),
    ("开盘价", "factor_open"),
    ("最高价", "factor_high"),
    ("最低价", "factor_low"),
    ("昨收价", "factor_pre_close"),
    ("涨跌额", "factor_change"),
    ("涨跌幅", "factor_pct_change"),
    ("open", "factor_open"),
    ("high", "factor_high"),
    ("low", "factor_low"),
    ("pre_close", "factor_pre_close"),
    ("change", "factor_change"),
    ("pct_change", "factor_pct_change"),
    // Volume and amount
    ("factor_vol", "factor_vol"),
    ("factor_amount", "factor_amount"),
    ("成交量", "factor_vol"),
    ("成交额", "factor_amount"),
    ("vol", "factor_vol"),
    ("amount", "factor_amount"),
    // Adjustment factor
    ("factor_adj_factor", "factor_adj_factor"),
    ("复权因子", "factor_adj_factor"),
    ("adj_factor", "factor_adj_factor"),
    // Backward-adjusted prices
    ("factor_open_hfq", "factor_open_hfq"),
    ("factor_close_hfq", "factor_close_hfq"),
    ("factor_high_hfq", "factor_high_hfq"),
    ("factor_low_hfq", "factor_low_hfq"),
    ("factor_pre_close_hfq", "factor_pre_close_hfq"),
    ("后复权开盘价", "factor_open_hfq"),
    ("后复权收盘价", "factor_close_hfq"),
    ("后复权最高价", "factor_high_hfq"),
    ("后复权最低价", "factor_low_hfq"),
    ("后复权昨收价", "factor_pre_close_hfq"),
    // Forward-adjusted prices
    ("factor_open_qfq", "factor_open_qfq"),
    ("factor_close_qfq", "factor_close_qfq"),
    ("factor_high_qfq", "factor_high_qfq"),
    ("factor_low_qfq", "factor_low_qfq"),
    ("factor_pre_close_qfq", "factor_pre_close_qfq"),
    ("前复权开盘价", "factor_open_qfq"),
    ("前复权收盘价", "factor_close_qfq"),
    ("前复权最高价", "factor_high_qfq"),
    ("前复权最低价", "factor_low_qfq"),
    ("前复权昨收价", "factor_pre_close_qfq"),
    // MACD
    ("macd_dif", "factor_macd_dif"),
    ("macd_dea", "factor_macd_dea"),
    ("macd", "factor_macd"),
    ("factor_macd_dif", "factor_macd_dif"),
    ("factor_macd_dea", "factor_macd_dea"),
    ("factor_macd", "factor_macd"),
    ("dif", "factor_macd_dif"),
    ("dea", "factor_macd_dea"),
    // KDJ
    ("kdj_k", "factor_kdj_k"),
    ("kdj_d", "factor_kdj_d"),
    ("kdj_j", "factor_kdj_j"),
    ("factor_kdj_k", "factor_kdj_k"),
    ("factor_kdj_d", "factor_kdj_d"),
    ("factor_kdj_j", "factor_kdj_j"),
    ("k值", "factor_kdj_k"),
    ("d值", "factor_kdj_d"),
    ("j值", "factor_kdj_j"),
    // RSI
    ("rsi_6", "factor_rsi_6"),
    ("rsi_12", "factor_rsi_12"),
    ("rsi_24", "factor_rsi_24"),
    ("factor_rsi_6", "factor_rsi_6"),
    ("factor_rsi_12", "factor_rsi_12"),
    ("factor_rsi_24", "factor_rsi_24"),
    // Bollinger bands
    ("boll_upper", "factor_boll_upper"),
    ("boll_mid", "factor_boll_mid"),
    ("boll_lower", "factor_boll_lower"),
    ("factor_boll_upper", "factor_boll_upper"),
    ("factor_boll_mid", "factor_boll_mid"),
    ("factor_boll_lower", "factor_boll_lower"),
    ("布林上轨", "factor_boll_upper"),
    ("布林中轨", "factor_boll_mid"),
    ("布林下轨", "factor_boll_lower"),
    // CCI
    ("cci", "factor_cci"),
    ("factor_cci", "factor_cci"),
    // Money flow
    ("moneyflow_pct_change", "moneyflow_pct_change"),
    ("moneyflow_latest", "moneyflow_latest"),
    ("moneyflow_net_amount", "moneyflow_net_amount"),
    ("moneyflow_net_d5_amount", "moneyflow_net_d5_amount"),
    ("资金流涨跌幅", "moneyflow_pct_change"),
    ("最新价", "moneyflow_latest"),
    ("净流入额", "moneyflow_net_amount"),
    ("5日净流入额", "moneyflow_net_d5_amount"),
    // Large orders
    ("moneyflow_buy_lg_amount", "moneyflow_buy_lg_amount"),
    ("moneyflow_buy_lg_amount_rate", "moneyflow_buy_lg_amount_rate"),
    ("大单买入额", "moneyflow_buy_lg_amount"),
    ("大单买入额占比", "moneyflow_buy_lg_amount_rate"),
    // Medium orders
    ("moneyflow_buy_md_amount", "moneyflow_buy_md_amount"),
    ("moneyflow_buy_md_amount_rate", "moneyflow_buy_md_amount_rate"),
    ("中单买入额", "moneyflow_buy_md_amount"),
    ("中单买入额占比", "moneyflow_buy_md_amount_rate"),
    // Small orders
    ("moneyflow_buy_sm_amount", "moneyflow_buy_sm_amount"),
    ("moneyflow_buy_sm_amount_rate", "moneyflow_buy_sm_amount_rate"),
    ("小单买入额", "moneyflow_buy_sm_amount"),
    ("小单买入额占比", "moneyflow_buy_sm_amount_rate"),
    // Moving averages
    ("ma5", "ma5"),
    ("ma10", "ma10"),
    ("ma20", "ma20"),
    ("ma30", "ma30"),
    ("ma60", "ma60"),
    ("ma120", "ma120"),
    ("5日均线", "ma5"),
    ("10日均线", "ma10"),
    ("20日均线", "ma20"),
    ("30日均线", "ma30"),
    ("60日均线", "ma60"),
    ("120日均线", "ma120"),
];

/// Lowercase `s` one character at a time, keeping any character whose
/// lowercase form would change its UTF-8 length.
///
/// Byte offsets into the result are valid offsets into `s`, which is what the
/// field rewriter relies on when it scans a folded copy and edits the original.
pub fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

/// A single alias entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Case-folded surface spelling.
    pub alias: String,
    /// Canonical storage field.
    pub field: String,
}

impl Alias {
    /// An identity entry maps a field onto itself and never rewrites.
    pub fn is_identity(&self) -> bool {
        self.alias == self.field
    }
}

/// Many-to-one mapping from alias spellings to canonical fields.
///
/// Entries keep insertion order so that rewriting and projection
/// augmentation are deterministic.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<Alias>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in alias table for the `stock_business` schema.
    pub fn builtin() -> Self {
        BUILTIN_ALIASES.iter().copied().collect()
    }

    /// Add or replace an alias.
    ///
    /// Re-inserting an existing alias (compared case-insensitively) updates
    /// its target but keeps its original position.
    pub fn insert(&mut self, alias: impl AsRef<str>, field: impl Into<String>) {
        let key = fold_case(alias.as_ref().trim());
        let field = field.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].field = field,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(Alias { alias: key, field });
            }
        }
    }

    /// Resolve an alias to its canonical field.
    pub fn canonicalize(&self, alias: &str) -> Option<&str> {
        self.index
            .get(&fold_case(alias.trim()))
            .map(|&i| self.entries[i].field.as_str())
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Alias] {
        &self.entries
    }

    /// Entries that actually rewrite something.
    pub fn rewrite_pairs(&self) -> impl Iterator<Item = &Alias> + '_ {
        self.entries.iter().filter(|a| !a.is_identity())
    }

    /// Distinct canonical fields, in order of first appearance.
    pub fn canonical_fields(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .map(|a| a.field.as_str())
            .filter(|f| seen.insert(*f))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: AsRef<str>, F: Into<String>> FromIterator<(A, F)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (A, F)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (alias, field) in iter {
            table.insert(alias, field);
        }
        table
    }
}
