//! Schema introspection queries against `information_schema`.
//!
//! Identifier columns are cast to `text` because `information_schema` uses
//! domain types that SQLx will not decode as `String`.

use std::collections::BTreeMap;

use super::models::{ColumnInfo, DatabaseSchema, ForeignKey, TableInfo};
use super::DbPool;

/// A column row as returned by `information_schema.columns`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub column_default: Option<String>,
    pub is_nullable: String,
}

/// Base tables of `schema`, ordered by name.
pub async fn list_tables(pool: &DbPool, schema: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = $1 AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
}

/// Columns of every table in `schema`, ordered by table then position.
pub async fn list_columns(pool: &DbPool, schema: &str) -> Result<Vec<ColumnRow>, sqlx::Error> {
    sqlx::query_as::<_, ColumnRow>(
        r#"
        SELECT
            c.table_name::text AS table_name,
            c.column_name::text AS column_name,
            c.data_type::text AS data_type,
            c.column_default::text AS column_default,
            c.is_nullable::text AS is_nullable
        FROM information_schema.columns c
        JOIN information_schema.tables t
          ON t.table_schema = c.table_schema
         AND t.table_name = c.table_name
        WHERE c.table_schema = $1 AND t.table_type = 'BASE TABLE'
        ORDER BY c.table_name, c.ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
}

/// Foreign keys declared in `schema`.
pub async fn list_foreign_keys(pool: &DbPool, schema: &str) -> Result<Vec<ForeignKey>, sqlx::Error> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT
            tc.table_name::text,
            kcu.column_name::text,
            ccu.table_name::text AS foreign_table_name,
            ccu.column_name::text AS foreign_column_name
        FROM information_schema.table_constraints AS tc
        JOIN information_schema.key_column_usage AS kcu
          ON tc.constraint_name = kcu.constraint_name
         AND tc.table_schema = kcu.table_schema
        JOIN information_schema.constraint_column_usage AS ccu
          ON ccu.constraint_name = tc.constraint_name
         AND ccu.table_schema = tc.table_schema
        WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1
        ORDER BY tc.table_name, kcu.column_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(table, column, foreign_table, foreign_column)| ForeignKey {
            table,
            column,
            foreign_table,
            foreign_column,
        })
        .collect())
}

/// Load the full schema description.
pub async fn load_schema(pool: &DbPool, schema: &str) -> Result<DatabaseSchema, sqlx::Error> {
    let tables = list_tables(pool, schema).await?;
    let columns = list_columns(pool, schema).await?;
    let foreign_keys = list_foreign_keys(pool, schema).await?;

    Ok(DatabaseSchema {
        tables: group_columns(tables, columns),
        foreign_keys,
    })
}

/// Attach column rows to their tables. Tables without visible columns are
/// still listed.
pub fn group_columns(tables: Vec<String>, columns: Vec<ColumnRow>) -> Vec<TableInfo> {
    let mut by_table: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();
    for row in columns {
        by_table.entry(row.table_name).or_default().push(ColumnInfo {
            name: row.column_name,
            data_type: row.data_type,
            default: row.column_default.filter(|d| !d.is_empty()),
            nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
        });
    }

    tables
        .into_iter()
        .map(|name| {
            let columns = by_table.remove(&name).unwrap_or_default();
            TableInfo { name, columns }
        })
        .collect()
}
