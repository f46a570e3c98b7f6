//! Axum HTTP API for text2sql.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::{GeneratedSql, QueryOutcome, SqlPipeline};

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: SqlPipeline,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/query", post(run_query))
        .route("/api/generate", post(generate))
        .route("/api/normalize", post(normalize))
        .route("/api/fields", get(list_fields))
        .route("/api/exemplars", get(list_exemplars))
        .route("/api/indicators/{name}", get(explain_indicator))
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn serve(
    pipeline: SqlPipeline,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState { pipeline });
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "text2sql server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

/// POST /query - Generate SQL and execute it
async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(Json(state.pipeline.query(&req.query).await))
}

/// POST /api/generate - Generate SQL without executing it
async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<GeneratedSql>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(Json(state.pipeline.generate(&req.query).await))
}

#[derive(Deserialize, Serialize)]
struct SqlBody {
    sql: String,
}

/// POST /api/normalize - Rewrite aliases and complete the projection
async fn normalize(State(state): State<Arc<AppState>>, Json(req): Json<SqlBody>) -> Json<SqlBody> {
    Json(SqlBody {
        sql: state.pipeline.knowledge().normalize(&req.sql),
    })
}

#[derive(Serialize)]
struct FieldInfo {
    name: &'static str,
    description: &'static str,
}

/// GET /api/fields - Schema fields
async fn list_fields(State(state): State<Arc<AppState>>) -> Json<Vec<FieldInfo>> {
    let fields = state
        .pipeline
        .knowledge()
        .schema
        .fields()
        .iter()
        .map(|f| FieldInfo {
            name: f.name,
            description: f.description,
        })
        .collect();
    Json(fields)
}

/// GET /api/exemplars - Exemplar phrases
async fn list_exemplars(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let phrases = state
        .pipeline
        .knowledge()
        .exemplars
        .iter()
        .map(|e| e.phrase.clone())
        .collect();
    Json(phrases)
}

#[derive(Serialize)]
struct IndicatorExplanation {
    name: String,
    explanation: String,
}

/// GET /api/indicators/{name} - Explain a technical indicator
async fn explain_indicator(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<IndicatorExplanation> {
    let explanation = state.pipeline.knowledge().indicators.explain(&name).to_string();
    Json(IndicatorExplanation { name, explanation })
}
