//! Schema service for describing the database to models and clients.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::DataSource;
use crate::error::AppResult;
use crate::result_ext::ResultExt;

/// Table name and column names, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: Vec<String>,
}

/// Service for schema operations.
#[derive(Clone)]
pub struct SchemaService {
    data: Arc<dyn DataSource>,
    hidden_tables: Arc<Vec<String>>,
}

impl SchemaService {
    /// Create a new schema service. `hidden_tables` are omitted from
    /// [`SchemaService::tables`] but still described to the model.
    pub fn new(data: Arc<dyn DataSource>, hidden_tables: Vec<String>) -> Self {
        Self {
            data,
            hidden_tables: Arc::new(hidden_tables),
        }
    }

    /// Current schema as pseudo-DDL.
    pub async fn describe(&self) -> AppResult<String> {
        let schema = self.data.schema().await.log("describing schema")?;
        let ddl = schema.to_ddl();
        tracing::info!(length = ddl.len(), "Retrieved database schema");
        Ok(ddl)
    }

    /// Visible tables with their column names.
    pub async fn tables(&self) -> AppResult<Vec<TableSummary>> {
        let schema = self.data.schema().await.log("listing tables")?;
        Ok(schema
            .tables
            .into_iter()
            .filter(|t| !self.is_hidden(&t.name))
            .map(|t| TableSummary {
                name: t.name,
                columns: t.columns.into_iter().map(|c| c.name).collect(),
            })
            .collect())
    }

    /// Every table name, hidden ones included.
    pub async fn table_names(&self) -> AppResult<Vec<String>> {
        Ok(self.data.schema().await?.table_names())
    }

    fn is_hidden(&self, table: &str) -> bool {
        self.hidden_tables
            .iter()
            .any(|hidden| hidden.eq_ignore_ascii_case(table))
    }
}
