//! Schema and result models.

use serde::{Deserialize, Serialize};

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub nullable: bool,
}

/// A table and its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// A single-column foreign key reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Everything the model is told about the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: Vec<TableInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl DatabaseSchema {
    /// Table names in schema order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Render the schema as pseudo-DDL for prompts.
    ///
    /// ```text
    /// CREATE TABLE projects (
    ///   id integer NOT NULL DEFAULT nextval('projects_id_seq'::regclass),
    ///   name text NULL
    /// );
    ///
    /// -- Foreign Key Relationships:
    /// -- project_tech.project_id -> projects.id
    /// ```
    pub fn to_ddl(&self) -> String {
        if self.tables.is_empty() {
            return "No tables found in the database.".to_string();
        }

        let mut blocks: Vec<String> = self
            .tables
            .iter()
            .map(|table| {
                let columns: Vec<String> = table.columns.iter().map(column_ddl).collect();
                format!(
                    "CREATE TABLE {} (\n  {}\n);",
                    table.name,
                    columns.join(",\n  ")
                )
            })
            .collect();

        if !self.foreign_keys.is_empty() {
            let mut lines = vec!["-- Foreign Key Relationships:".to_string()];
            lines.extend(self.foreign_keys.iter().map(|fk| {
                format!(
                    "-- {}.{} -> {}.{}",
                    fk.table, fk.column, fk.foreign_table, fk.foreign_column
                )
            }));
            blocks.push(lines.join("\n"));
        }

        blocks.join("\n\n")
    }
}

fn column_ddl(column: &ColumnInfo) -> String {
    let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
    match &column.default {
        Some(default) => format!(
            "{} {} {} DEFAULT {}",
            column.name, column.data_type, nullable, default
        ),
        None => format!("{} {} {}", column.name, column.data_type, nullable),
    }
}

/// Rows produced by a generated query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in select-list order
    pub columns: Vec<String>,
    /// One JSON object per row, keyed by column name
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    /// More rows existed than were returned
    pub truncated: bool,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
