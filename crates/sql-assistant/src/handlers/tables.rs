//! Schema endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::services::TableSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: String,
}

/// List visible tables and their columns.
///
/// `GET /api/tables`
///
/// ```json
/// { "tables": [ { "name": "projects", "columns": ["id", "name"] } ] }
/// ```
pub async fn list_tables(State(state): State<AppState>) -> AppResult<Json<TablesResponse>> {
    let tables = state.schema.tables().await?;
    Ok(Json(TablesResponse { tables }))
}

/// The schema description the model sees.
///
/// `GET /api/schema`
pub async fn get_schema(State(state): State<AppState>) -> AppResult<Json<SchemaResponse>> {
    let schema = state.schema.describe().await?;
    Ok(Json(SchemaResponse { schema }))
}
