use insta::assert_snapshot;
use text2sql::knowledge::AliasTable;
use text2sql::normalize::{find_spans, rewrite};

fn open_only() -> AliasTable {
    [("open", "factor_open")].into_iter().collect()
}

#[test]
fn test_rewrite_is_idempotent() {
    let table = AliasTable::builtin();
    let inputs = [
        "SELECT ts_code, stock_name FROM stock_business WHERE kdj_k > kdj_d AND kdj_k < 20",
        "SELECT TS_CODE, OPEN, HIGH FROM STOCK_BUSINESS WHERE MACD_DIF > MACD_DEA",
        "select ts_code, 市盈率, 换手率 from stock_business where 市盈率 < 20",
        "SELECT Open, pct_change FROM stock_business WHERE vol>1000;",
        "",
        "not sql at all",
    ];

    for sql in inputs {
        let once = rewrite(sql, &table);
        let twice = rewrite(&once, &table);
        assert_eq!(once, twice, "second pass changed {:?}", sql);
    }
}

#[test]
fn test_substring_of_identifier_untouched() {
    let table = open_only();
    let sql = "SELECT reopening_flag, open_interest FROM t WHERE reopening_flag = 1";
    assert_eq!(rewrite(sql, &table), sql);
}

#[test]
fn test_every_boundary_character() {
    let table = open_only();
    for sep in [' ', ',', '(', ')', '=', '<', '>', '!', '*', '/', '+', '-', '\n', '\t'] {
        let sql = format!("x{sep}open{sep}y");
        assert_eq!(rewrite(&sql, &table), format!("x{sep}factor_open{sep}y"));
    }
}

#[test]
fn test_qualified_name_not_rewritten() {
    // '.' is not a boundary character.
    let table = open_only();
    assert_eq!(rewrite("SELECT t.open FROM t", &table), "SELECT t.open FROM t");
}

#[test]
fn test_upper_case_preserved() {
    let table = open_only();
    assert_eq!(
        rewrite("SELECT OPEN FROM T WHERE OPEN > 1", &table),
        "SELECT FACTOR_OPEN FROM T WHERE FACTOR_OPEN > 1"
    );
}

#[test]
fn test_mixed_case_uses_stored_spelling() {
    let table = open_only();
    assert_eq!(rewrite("SELECT Open FROM t", &table), "SELECT factor_open FROM t");
}

#[test]
fn test_lower_case_preserved() {
    let table = open_only();
    assert_eq!(rewrite("select open from t", &table), "select factor_open from t");
}

#[test]
fn test_chinese_labels_rewritten() {
    let table = AliasTable::builtin();
    let sql = "SELECT ts_code, 市盈率, 5日均线 FROM stock_business WHERE 市盈率 < 20 AND 换手率 > 5";
    assert_snapshot!(
        rewrite(sql, &table),
        @"SELECT ts_code, pe, ma5 FROM stock_business WHERE pe < 20 AND turnover_rate > 5"
    );
}

#[test]
fn test_longer_label_not_split() {
    // "净流入额" must not match inside "5日净流入额".
    let table = AliasTable::builtin();
    assert_eq!(
        rewrite("SELECT 5日净流入额 FROM stock_business", &table),
        "SELECT moneyflow_net_d5_amount FROM stock_business"
    );
}

#[test]
fn test_indicator_value_labels_follow_case() {
    let table = AliasTable::builtin();
    assert_eq!(
        rewrite("WHERE K值 > D值", &table),
        "WHERE FACTOR_KDJ_K > FACTOR_KDJ_D"
    );
    assert_eq!(
        rewrite("where k值 > d值", &table),
        "where factor_kdj_k > factor_kdj_d"
    );
}

#[test]
fn test_empty_and_unmatched_input() {
    let table = AliasTable::builtin();
    assert_eq!(rewrite("", &table), "");
    assert_eq!(rewrite("SELECT 1", &table), "SELECT 1");
    assert!(find_spans("SELECT ts_code FROM stock_business", &table).is_empty());
}

#[test]
fn test_start_and_end_of_input_are_boundaries() {
    let table = open_only();
    assert_eq!(rewrite("open", &table), "factor_open");
    assert_eq!(rewrite("open;", &table), "factor_open;");
}

#[test]
fn test_spans_cover_all_occurrences() {
    let table = AliasTable::builtin();
    let spans = find_spans("kdj_k > kdj_d AND kdj_k < 20", &table);
    let mut starts: Vec<_> = spans.iter().map(|s| s.start).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![0, 8, 18]);
}
