use std::fs;
use std::path::PathBuf;

use text2sql::knowledge::{Knowledge, KnowledgeError, KnowledgeFile, UNKNOWN_INDICATOR};

const KNOWLEDGE_TOML: &str = r#"
[aliases]
"收盘" = "daily_close"
"rsi" = "factor_rsi_6"

[[exemplars]]
phrase = "RSI超卖"
sql = "SELECT ts_code, stock_name, factor_rsi_6 FROM stock_business WHERE factor_rsi_6 < 20"

[indicators]
"RSI" = "相对强弱指标，低于20通常视为超卖。"
"量比" = "自定义解释"
"#;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("text2sql-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_apply_extends_builtins() {
    let mut knowledge = Knowledge::builtin();
    let builtin_exemplars = knowledge.exemplars.len();

    KnowledgeFile::from_toml(KNOWLEDGE_TOML)
        .unwrap()
        .apply(&mut knowledge)
        .unwrap();

    assert_eq!(knowledge.aliases.canonicalize("收盘"), Some("daily_close"));
    assert_eq!(knowledge.aliases.canonicalize("RSI"), Some("factor_rsi_6"));
    assert_eq!(knowledge.exemplars.len(), builtin_exemplars + 1);
    assert_eq!(knowledge.exemplars.last().unwrap().phrase, "RSI超卖");
    assert!(knowledge.indicators.explain("rsi").contains("超卖"));
    assert_eq!(knowledge.indicators.explain("量比"), "自定义解释");
}

#[test]
fn test_custom_alias_used_by_normalize() {
    let mut knowledge = Knowledge::builtin();
    KnowledgeFile::from_toml(KNOWLEDGE_TOML)
        .unwrap()
        .apply(&mut knowledge)
        .unwrap();

    assert_eq!(
        knowledge.normalize("SELECT ts_code FROM stock_business WHERE rsi < 20"),
        "SELECT ts_code, factor_rsi_6 FROM stock_business WHERE factor_rsi_6 < 20"
    );
}

#[test]
fn test_unknown_field_rejected() {
    let file = KnowledgeFile::from_toml("[aliases]\n\"atr\" = \"factor_atr\"\n").unwrap();
    let mut knowledge = Knowledge::builtin();
    let aliases_before = knowledge.aliases.len();

    let err = file.apply(&mut knowledge).unwrap_err();
    assert!(matches!(err, KnowledgeError::UnknownField { .. }));
    assert!(err.to_string().contains("factor_atr"));
    assert_eq!(knowledge.aliases.len(), aliases_before);
}

#[test]
fn test_field_name_cannot_alias_another_field() {
    let file = KnowledgeFile::from_toml("[aliases]\n\"pe\" = \"pe_ttm\"\n").unwrap();
    let mut knowledge = Knowledge::builtin();

    let err = file.apply(&mut knowledge).unwrap_err();
    assert!(matches!(err, KnowledgeError::AliasShadowsField { .. }));
    assert_eq!(knowledge.aliases.canonicalize("pe"), Some("pe"));

    // Rewriting stays idempotent with the built-in table.
    let once = knowledge.normalize("SELECT ts_code FROM stock_business WHERE 市盈率 < 40");
    assert_eq!(knowledge.normalize(&once), once);
}

#[test]
fn test_empty_exemplar_rejected() {
    let file = KnowledgeFile::from_toml("[[exemplars]]\nphrase = \"\"\nsql = \"SELECT 1\"\n").unwrap();
    let err = file.apply(&mut Knowledge::builtin()).unwrap_err();
    assert!(matches!(err, KnowledgeError::EmptyExemplar(0)));
}

#[test]
fn test_malformed_toml() {
    let result = KnowledgeFile::from_toml("[aliases\n");
    assert!(matches!(result, Err(KnowledgeError::ParseError(_))));
}

#[test]
fn test_knowledge_from_file() {
    let path = write_temp("knowledge.toml", KNOWLEDGE_TOML);
    let knowledge = Knowledge::from_file(&path).unwrap();
    fs::remove_file(&path).ok();

    let m = knowledge.match_exemplar("rsi超卖", 0.7).unwrap();
    assert_eq!(m.exemplar.phrase, "RSI超卖");
    assert_eq!(knowledge.indicators.explain("ATR"), UNKNOWN_INDICATOR);
}

#[test]
fn test_knowledge_from_missing_file() {
    let result = Knowledge::from_file("/nonexistent/text2sql/knowledge.toml");
    assert!(matches!(result, Err(KnowledgeError::FileNotFound(_))));
}
