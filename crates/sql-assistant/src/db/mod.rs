//! Database module for the SQL Assistant server.
//!
//! This module provides PostgreSQL connectivity, schema introspection and
//! read-only execution of generated queries using SQLx.

pub mod models;
pub mod pool;
pub mod rows;
pub mod schema;
pub mod source;

pub use models::{ColumnInfo, DatabaseSchema, ForeignKey, QueryResult, TableInfo};
pub use pool::{create_pool, DbPool};
pub use source::{DataSource, PgDataSource};
