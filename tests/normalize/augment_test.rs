use insta::assert_snapshot;
use text2sql::knowledge::{AliasTable, Knowledge};
use text2sql::normalize::{augment, normalize_and_augment};

fn fields() -> Vec<&'static str> {
    vec!["ts_code", "stock_name", "pe", "pe_ttm", "turnover_rate", "factor_kdj_k", "factor_kdj_d"]
}

#[test]
fn test_filtered_field_is_projected() {
    let sql = "SELECT ts_code, stock_name FROM stock_business WHERE pe < 40";
    assert_eq!(
        augment(sql, &fields()),
        "SELECT ts_code, stock_name, pe FROM stock_business WHERE pe < 40"
    );
}

#[test]
fn test_group_by_bypass() {
    let sql = "SELECT ts_code FROM stock_business WHERE pe < 40 GROUP BY ts_code";
    assert_eq!(augment(sql, &fields()), sql);
}

#[test]
fn test_join_having_union_bypass() {
    let cases = [
        "SELECT a.ts_code FROM stock_business a JOIN other b ON a.ts_code = b.ts_code WHERE pe < 1",
        "SELECT ts_code FROM stock_business WHERE pe < 1 HAVING count(*) > 1",
        "SELECT ts_code FROM stock_business WHERE pe < 1 UNION SELECT ts_code FROM stock_business",
    ];
    for sql in cases {
        assert_eq!(augment(sql, &fields()), sql);
    }
}

#[test]
fn test_no_where_clause_unchanged() {
    let sql = "SELECT ts_code FROM stock_business LIMIT 5";
    assert_eq!(augment(sql, &fields()), sql);
}

#[test]
fn test_non_sql_unchanged() {
    assert_eq!(augment("", &fields()), "");
    assert_eq!(augment("where pe < 1", &fields()), "where pe < 1");
    assert_eq!(augment("hello world", &fields()), "hello world");
}

#[test]
fn test_already_projected_forms() {
    let cases = [
        "SELECT ts_code, PE FROM stock_business WHERE pe < 40",
        "SELECT s.ts_code, s.pe FROM stock_business s WHERE s.pe < 40",
        "SELECT ts_code, price / eps AS pe FROM stock_business WHERE pe < 40",
        "SELECT * FROM stock_business WHERE pe < 40",
    ];
    for sql in cases {
        assert_eq!(augment(sql, &fields()), sql, "changed {:?}", sql);
    }
}

#[test]
fn test_multiple_fields_in_field_order() {
    let sql = "SELECT ts_code FROM stock_business WHERE turnover_rate > 5 AND pe_ttm < 30 AND pe < 40";
    assert_snapshot!(
        augment(sql, &fields()),
        @"SELECT ts_code, pe, pe_ttm, turnover_rate FROM stock_business WHERE turnover_rate > 5 AND pe_ttm < 30 AND pe < 40"
    );
}

#[test]
fn test_fields_after_limit_ignored() {
    let sql = "SELECT ts_code FROM stock_business WHERE pe < 40 ORDER BY turnover_rate DESC LIMIT 10";
    assert_eq!(
        augment(sql, &fields()),
        "SELECT ts_code, pe FROM stock_business WHERE pe < 40 ORDER BY turnover_rate DESC LIMIT 10"
    );
}

#[test]
fn test_case_insensitive_keywords() {
    let sql = "select ts_code\nfrom stock_business\nwhere PE < 40;";
    assert_eq!(
        augment(sql, &fields()),
        "select ts_code, pe\nfrom stock_business\nwhere PE < 40;"
    );
}

#[test]
fn test_llm_candidate_end_to_end() {
    let aliases = AliasTable::builtin();
    let canonical = aliases.canonical_fields();
    let candidate =
        "SELECT ts_code, stock_name FROM stock_business WHERE kdj_k > kdj_d AND kdj_k < 20";

    assert_eq!(
        normalize_and_augment(candidate, &aliases, &canonical),
        "SELECT ts_code, stock_name, factor_kdj_k, factor_kdj_d FROM stock_business WHERE factor_kdj_k > factor_kdj_d AND factor_kdj_k < 20"
    );
}

#[test]
fn test_knowledge_normalize_with_labels() {
    let knowledge = Knowledge::builtin();
    assert_snapshot!(
        knowledge.normalize("SELECT ts_code, stock_name FROM stock_business WHERE 量比 > 2 AND 换手率 > 5 LIMIT 20"),
        @"SELECT ts_code, stock_name, turnover_rate, volume_ratio FROM stock_business WHERE volume_ratio > 2 AND turnover_rate > 5 LIMIT 20"
    );
}
