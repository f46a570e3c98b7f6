//! Storage schema catalog for the `stock_business` wide table.
//!
//! The catalog is the source of truth for which field names are canonical.
//! It also renders the schema description that is handed to the language
//! model alongside the user's query.

use std::fmt::Write;

/// Name of the single table every generated query targets.
pub const STOCK_TABLE: &str = "stock_business";

/// Logical grouping of schema fields, used only for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Basic,
    Valuation,
    Capital,
    Price,
    Volume,
    Adjusted,
    Indicator,
    MoneyFlow,
    MovingAverage,
}

impl FieldGroup {
    fn title(&self) -> &'static str {
        match self {
            FieldGroup::Basic => "基本信息",
            FieldGroup::Valuation => "估值指标",
            FieldGroup::Capital => "股本与市值",
            FieldGroup::Price => "价格",
            FieldGroup::Volume => "成交",
            FieldGroup::Adjusted => "复权价格",
            FieldGroup::Indicator => "技术指标",
            FieldGroup::MoneyFlow => "资金流",
            FieldGroup::MovingAverage => "均线",
        }
    }
}

/// A single column of the storage schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
    pub group: FieldGroup,
}

const fn field(name: &'static str, description: &'static str, group: FieldGroup) -> SchemaField {
    SchemaField {
        name,
        description,
        group,
    }
}

use FieldGroup::*;

const STOCK_FIELDS: &[SchemaField] = &[
    field("ts_code", "股票代码", Basic),
    field("stock_name", "股票名称", Basic),
    field("trade_date", "交易日期", Basic),
    field("daily_close", "收盘价", Basic),
    field("turnover_rate", "换手率(%)", Valuation),
    field("turnover_rate_f", "自由流通股换手率(%)", Valuation),
    field("volume_ratio", "量比", Valuation),
    field("pe", "市盈率(总市值/净利润)", Valuation),
    field("pe_ttm", "市盈率TTM", Valuation),
    field("pb", "市净率(总市值/净资产)", Valuation),
    field("ps", "市销率", Valuation),
    field("ps_ttm", "市销率TTM", Valuation),
    field("dv_ratio", "股息率(%)", Valuation),
    field("dv_ttm", "股息率TTM(%)", Valuation),
    field("total_share", "总股本(万股)", Capital),
    field("float_share", "流通股本(万股)", Capital),
    field("free_share", "自由流通股本(万股)", Capital),
    field("total_mv", "总市值(万元)", Capital),
    field("circ_mv", "流通市值(万元)", Capital),
    field("factor_open", "开盘价", Price),
    field("factor_high", "最高价", Price),
    field("factor_low", "最低价", Price),
    field("factor_pre_close", "昨收价", Price),
    field("factor_change", "涨跌额", Price),
    field("factor_pct_change", "涨跌幅(%)", Price),
    field("factor_vol", "成交量(手)", Volume),
    field("factor_amount", "成交额(千元)", Volume),
    field("factor_adj_factor", "复权因子", Adjusted),
    field("factor_open_hfq", "后复权开盘价", Adjusted),
    field("factor_close_hfq", "后复权收盘价", Adjusted),
    field("factor_high_hfq", "后复权最高价", Adjusted),
    field("factor_low_hfq", "后复权最低价", Adjusted),
    field("factor_pre_close_hfq", "后复权昨收价", Adjusted),
    field("factor_open_qfq", "前复权开盘价", Adjusted),
    field("factor_close_qfq", "前复权收盘价", Adjusted),
    field("factor_high_qfq", "前复权最高价", Adjusted),
    field("factor_low_qfq", "前复权最低价", Adjusted),
    field("factor_pre_close_qfq", "前复权昨收价", Adjusted),
    field("factor_macd_dif", "MACD DIF线", Indicator),
    field("factor_macd_dea", "MACD DEA线", Indicator),
    field("factor_macd", "MACD柱", Indicator),
    field("factor_kdj_k", "KDJ K值", Indicator),
    field("factor_kdj_d", "KDJ D值", Indicator),
    field("factor_kdj_j", "KDJ J值", Indicator),
    field("factor_rsi_6", "6日RSI", Indicator),
    field("factor_rsi_12", "12日RSI", Indicator),
    field("factor_rsi_24", "24日RSI", Indicator),
    field("factor_boll_upper", "布林上轨", Indicator),
    field("factor_boll_mid", "布林中轨", Indicator),
    field("factor_boll_lower", "布林下轨", Indicator),
    field("factor_cci", "CCI顺势指标", Indicator),
    field("moneyflow_pct_change", "资金流涨跌幅(%)", MoneyFlow),
    field("moneyflow_latest", "最新价", MoneyFlow),
    field("moneyflow_net_amount", "净流入额(万元)", MoneyFlow),
    field("moneyflow_net_d5_amount", "5日净流入额(万元)", MoneyFlow),
    field("moneyflow_buy_lg_amount", "大单买入额(万元)", MoneyFlow),
    field("moneyflow_buy_lg_amount_rate", "大单买入额占比(%)", MoneyFlow),
    field("moneyflow_buy_md_amount", "中单买入额(万元)", MoneyFlow),
    field("moneyflow_buy_md_amount_rate", "中单买入额占比(%)", MoneyFlow),
    field("moneyflow_buy_sm_amount", "小单买入额(万元)", MoneyFlow),
    field("moneyflow_buy_sm_amount_rate", "小单买入额占比(%)", MoneyFlow),
    field("ma5", "5日均线", MovingAverage),
    field("ma10", "10日均线", MovingAverage),
    field("ma20", "20日均线", MovingAverage),
    field("ma30", "30日均线", MovingAverage),
    field("ma60", "60日均线", MovingAverage),
    field("ma120", "120日均线", MovingAverage),
];

/// The storage schema: one table and its ordered field list.
#[derive(Debug, Clone)]
pub struct StockSchema {
    table: &'static str,
    fields: Vec<SchemaField>,
}

impl Default for StockSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StockSchema {
    /// The built-in `stock_business` schema.
    pub fn builtin() -> Self {
        Self {
            table: STOCK_TABLE,
            fields: STOCK_FIELDS.to_vec(),
        }
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Check whether `name` is a storage field (exact, case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Render the schema description handed to the language model.
    ///
    /// One header line for the table, then one section per field group,
    /// each field as `- name: description`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "表名: {}", self.table);

        let mut current: Option<FieldGroup> = None;
        for f in &self.fields {
            if current != Some(f.group) {
                let _ = writeln!(out, "\n## {}", f.group.title());
                current = Some(f.group);
            }
            let _ = writeln!(out, "- {}: {}", f.name, f.description);
        }

        out
    }
}
