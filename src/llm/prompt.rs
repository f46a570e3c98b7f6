//! Prompt construction.

use std::fmt::Write;

/// System message for chat-style providers.
pub const SYSTEM_PROMPT: &str = "你是一个专业的SQL转换助手，只输出SQL语句，不做任何解释。";

/// Indicator fields the model tends to name without their table prefix.
///
/// Listed in the prompt so the model emits canonical names directly; the
/// rewriter still fixes whatever slips through.
const PREFIX_HINTS: &[(&str, &[(&str, &str)])] = &[
    (
        "MACD相关字段",
        &[
            ("macd_dif", "factor_macd_dif"),
            ("macd_dea", "factor_macd_dea"),
            ("macd", "factor_macd"),
        ],
    ),
    (
        "KDJ相关字段",
        &[
            ("kdj_k", "factor_kdj_k"),
            ("kdj_d", "factor_kdj_d"),
            ("kdj_j", "factor_kdj_j"),
        ],
    ),
    (
        "RSI相关字段",
        &[
            ("rsi_6", "factor_rsi_6"),
            ("rsi_12", "factor_rsi_12"),
            ("rsi_24", "factor_rsi_24"),
        ],
    ),
    (
        "布林带相关字段",
        &[
            ("boll_upper", "factor_boll_upper"),
            ("boll_mid", "factor_boll_mid"),
            ("boll_lower", "factor_boll_lower"),
        ],
    ),
    (
        "价格字段",
        &[
            ("open", "factor_open"),
            ("high", "factor_high"),
            ("low", "factor_low"),
            ("close", "daily_close"),
        ],
    ),
];

/// Build the completion prompt for `query` against `schema`.
pub fn build_prompt(query: &str, schema: &str) -> String {
    let mut prompt = String::with_capacity(schema.len() + query.len() + 1024);

    prompt.push_str(
        "你是一个专业的SQL转换助手，请根据以下表结构和用户的查询，生成相应的SQL语句。\n\
         请只返回SQL语句本身，不要添加任何解释、注释或者markdown格式（如```sql或```等标记）。\n\
         不要使用反引号、代码块或其他格式标记，只返回可以直接执行的纯SQL语句。\n\n\
         生成SQL时请遵循以下规则：\n\
         1. 在SELECT语句中，除了基本的ts_code和stock_name字段外，还应包含用户查询条件中涉及的所有字段\n\
         2. 例如，如果用户查询关于\"市盈率(pe)\"和\"换手率(turnover_rate)\"的数据，应确保这些字段也包含在SELECT语句中\n\
         3. 确保生成的SQL语法正确且高效\n\
         4. 请注意：某些技术指标字段需要添加表前缀，具体如下：\n",
    );

    for (label, pairs) in PREFIX_HINTS {
        let mapped: Vec<String> = pairs
            .iter()
            .map(|(from, to)| format!("{} → {}", from, to))
            .collect();
        let _ = writeln!(prompt, "   - {}: {}", label, mapped.join(", "));
    }

    let _ = write!(
        prompt,
        "\n### 表结构：\n{}\n\n### 用户查询：\n{}\n\n### 生成的SQL语句（请只输出纯SQL语句，不要有任何其他内容）：\n",
        schema.trim_end(),
        query.trim()
    );

    prompt
}
