//! Natural-language query endpoint.

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::{ChartSpec, QueryAnswer};
use crate::state::AppState;

/// Request body for `POST /api/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
}

/// Response for a successful question.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub sql: String,
    pub columns: Vec<String>,
    pub results: Vec<serde_json::Map<String, serde_json::Value>>,
    pub row_count: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

impl From<QueryAnswer> for QueryResponse {
    fn from(answer: QueryAnswer) -> Self {
        Self {
            sql: answer.sql,
            columns: answer.columns,
            results: answer.rows,
            row_count: answer.row_count,
            truncated: answer.truncated,
            chart: answer.chart,
        }
    }
}

/// Answer a question in plain language.
///
/// `POST /api/query`
///
/// # Request Body
///
/// ```json
/// { "query": "How many projects are in development?" }
/// ```
///
/// # Responses
///
/// - `200` with `sql`, `columns`, `results`, `row_count`, `truncated`, `chart`
/// - `400` `{"error": "No query provided"}` when the body has no question
/// - `400` `{"error": ..., "sql": ...}` when the generated SQL fails
/// - `502` when the language model cannot be reached
pub async fn process_query(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<QueryResponse>> {
    // Any body without a usable question gets the same answer.
    let question = serde_json::from_slice::<QueryRequest>(&body)
        .ok()
        .and_then(|r| r.query)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No query provided".to_string()))?;

    let answer = state.assistant.ask(&question, &[]).await?;
    Ok(Json(answer.into()))
}
