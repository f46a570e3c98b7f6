use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use text2sql::config::DEFAULT_FALLBACK_SQL;
use text2sql::executor::{ExecutionResult, ExecutorError, ExecutorResult, SqlExecutor};
use text2sql::knowledge::Knowledge;
use text2sql::llm::{CandidateGenerator, LlmError, LlmResult};
use text2sql::pipeline::{SqlPipeline, SqlSource};

/// Generator that replays a fixed answer and counts calls.
struct FakeGenerator {
    answer: Result<String, ()>,
    calls: AtomicUsize,
    last_schema: Mutex<String>,
}

impl FakeGenerator {
    fn answering(sql: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(sql.to_string()),
            calls: AtomicUsize::new(0),
            last_schema: Mutex::new(String::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: Err(()),
            calls: AtomicUsize::new(0),
            last_schema: Mutex::new(String::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateGenerator for FakeGenerator {
    async fn generate_candidate(&self, _query: &str, schema: &str) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_schema.lock().unwrap() = schema.to_string();
        self.answer.clone().map_err(|_| LlmError::EmptyResponse)
    }
}

/// Executor that records the SQL it receives.
struct FakeExecutor {
    reject: bool,
    received: Mutex<Vec<String>>,
}

impl FakeExecutor {
    fn new(reject: bool) -> Arc<Self> {
        Arc::new(Self {
            reject,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SqlExecutor for FakeExecutor {
    async fn execute(&self, sql: &str) -> ExecutorResult<ExecutionResult> {
        self.received.lock().unwrap().push(sql.to_string());
        if self.reject {
            return Err(ExecutorError::Rejected {
                status: 500,
                message: "Unknown column 'kdj_k'".to_string(),
            });
        }
        Ok(serde_json::from_value(serde_json::json!({
            "code": 200,
            "msg": "ok",
            "data": [{"ts_code": "000001.SZ", "stock_name": "平安银行", "pe": 4.5}]
        }))
        .unwrap())
    }
}

fn pipeline(generator: Arc<FakeGenerator>) -> SqlPipeline {
    SqlPipeline::new(Arc::new(Knowledge::builtin()), generator)
}

const KDJ_CANDIDATE: &str =
    "SELECT ts_code, stock_name FROM stock_business WHERE kdj_k > kdj_d AND kdj_k < 20";

const KDJ_FINAL: &str = "SELECT ts_code, stock_name, factor_kdj_k, factor_kdj_d FROM stock_business WHERE factor_kdj_k > factor_kdj_d AND factor_kdj_k < 20";

#[tokio::test]
async fn test_exemplar_bypasses_model() {
    let generator = FakeGenerator::answering("SELECT 1");
    let pipeline = pipeline(generator.clone());

    let generated = pipeline.generate("市盈率低于40%").await;

    assert_eq!(
        generated.sql,
        "SELECT ts_code, stock_name, pe FROM stock_business WHERE pe < 40"
    );
    assert_eq!(
        generated.source,
        SqlSource::Exemplar {
            index: 4,
            phrase: "市盈率低于40%".to_string()
        }
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_model_candidate_is_normalized() {
    let generator = FakeGenerator::answering(KDJ_CANDIDATE);
    let pipeline = pipeline(generator.clone());

    let generated = pipeline.generate("找出KDJ低位金叉的股票").await;

    assert_eq!(generated.sql, KDJ_FINAL);
    assert_eq!(generated.source, SqlSource::Llm);
    assert_eq!(generator.calls(), 1);
    assert!(generator
        .last_schema
        .lock()
        .unwrap()
        .starts_with("表名: stock_business"));
}

#[tokio::test]
async fn test_fenced_candidate_is_cleaned() {
    let generator = FakeGenerator::answering(&format!("```sql\n{}\n```", KDJ_CANDIDATE));
    let generated = pipeline(generator).generate("找出KDJ低位金叉的股票").await;
    assert_eq!(generated.sql, KDJ_FINAL);
}

#[tokio::test]
async fn test_model_failure_falls_back() {
    let generator = FakeGenerator::failing();
    let generated = pipeline(generator).generate("布林带突破上轨").await;

    assert_eq!(generated.sql, DEFAULT_FALLBACK_SQL);
    assert!(matches!(generated.source, SqlSource::Fallback { .. }));
}

#[tokio::test]
async fn test_non_select_answer_falls_back() {
    let generator = FakeGenerator::answering("抱歉，我无法回答这个问题。");
    let pipeline = pipeline(generator).with_fallback_sql("SELECT ts_code FROM stock_business LIMIT 1");

    let generated = pipeline.generate("今天天气怎么样").await;

    assert_eq!(generated.sql, "SELECT ts_code FROM stock_business LIMIT 1");
    match generated.source {
        SqlSource::Fallback { reason } => assert!(reason.contains("SELECT")),
        other => panic!("unexpected source {:?}", other),
    }
}

#[tokio::test]
async fn test_without_exemplars_always_asks_model() {
    let generator = FakeGenerator::answering("SELECT ts_code FROM stock_business WHERE 市盈率 < 40");
    let pipeline = pipeline(generator.clone()).without_exemplars();

    let generated = pipeline.generate("市盈率低于40%").await;

    assert_eq!(generator.calls(), 1);
    assert_eq!(
        generated.sql,
        "SELECT ts_code, pe FROM stock_business WHERE pe < 40"
    );
}

#[tokio::test]
async fn test_threshold_is_configurable() {
    let generator = FakeGenerator::answering(KDJ_CANDIDATE);
    // "kdj金叉" is 5 of the 7 characters in the query: 0.714.
    let strict = pipeline(generator.clone()).with_threshold(0.8);
    assert_eq!(strict.generate("KDJ金叉信号").await.source, SqlSource::Llm);

    let lenient = pipeline(generator).with_threshold(0.7);
    assert!(matches!(
        lenient.generate("KDJ金叉信号").await.source,
        SqlSource::Exemplar { index: 0, .. }
    ));
}

#[tokio::test]
async fn test_query_executes_final_sql() {
    let executor = FakeExecutor::new(false);
    let pipeline = pipeline(FakeGenerator::answering(KDJ_CANDIDATE)).with_executor(executor.clone());

    let outcome = pipeline.query("找出KDJ低位金叉的股票").await;

    assert_eq!(outcome.sql, KDJ_FINAL);
    assert_eq!(outcome.result.code, 200);
    assert_eq!(outcome.result.row_count(), Some(1));
    assert_eq!(*executor.received.lock().unwrap(), vec![KDJ_FINAL.to_string()]);
}

#[tokio::test]
async fn test_query_reports_execution_failure() {
    let executor = FakeExecutor::new(true);
    let pipeline = pipeline(FakeGenerator::answering(KDJ_CANDIDATE)).with_executor(executor);

    let outcome = pipeline.query("找出KDJ低位金叉的股票").await;

    assert!(outcome.result.is_failure());
    assert_eq!(
        outcome.result.msg.as_deref(),
        Some("SQL execution failed: Unknown column 'kdj_k'")
    );
    assert_eq!(outcome.result.row_count(), Some(0));
}

#[tokio::test]
async fn test_query_without_executor() {
    let outcome = pipeline(FakeGenerator::answering(KDJ_CANDIDATE))
        .query("MACD金叉")
        .await;
    assert!(outcome.result.is_failure());
    assert!(matches!(outcome.source, SqlSource::Exemplar { index: 1, .. }));
}

#[tokio::test]
async fn test_outcome_serialization() {
    let executor = FakeExecutor::new(false);
    let pipeline = pipeline(FakeGenerator::answering(KDJ_CANDIDATE)).with_executor(executor);

    let outcome = pipeline.query("量比大于2").await;
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(
        json["sql"],
        "SELECT ts_code, stock_name, volume_ratio FROM stock_business WHERE volume_ratio > 2"
    );
    assert_eq!(json["source"]["kind"], "exemplar");
    assert_eq!(json["source"]["phrase"], "量比大于2");
    assert_eq!(json["result"]["code"], 200);
}

#[tokio::test]
async fn test_blank_query_takes_first_exemplar() {
    let generator = FakeGenerator::answering(KDJ_CANDIDATE);
    let generated = pipeline(generator.clone()).generate("   ").await;

    assert!(matches!(generated.source, SqlSource::Exemplar { index: 0, .. }));
    assert_eq!(generator.calls(), 0);
}
