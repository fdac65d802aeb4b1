//! The database seam used by services.

use async_trait::async_trait;
use futures::{TryStream, TryStreamExt};
use sqlx::Executor;

use super::models::{DatabaseSchema, QueryResult};
use super::pool::{health_check, DbPool};
use super::{rows, schema};
use crate::config::DatabaseConfig;
use crate::error::AppResult;

/// Read access to the database the assistant answers questions about.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Describe tables, columns and foreign keys.
    async fn schema(&self) -> AppResult<DatabaseSchema>;

    /// Run one already-sanitized read-only statement.
    async fn execute_select(&self, sql: &str) -> AppResult<QueryResult>;

    /// Whether the database is reachable.
    async fn ping(&self) -> bool;
}

/// [`DataSource`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgDataSource {
    pool: DbPool,
    schema: String,
    statement_timeout_ms: u64,
    max_rows: usize,
}

impl PgDataSource {
    pub fn new(pool: DbPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            schema: config.schema.clone(),
            statement_timeout_ms: config.statement_timeout_ms,
            max_rows: config.max_rows,
        }
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    async fn schema(&self) -> AppResult<DatabaseSchema> {
        let loaded = schema::load_schema(&self.pool, &self.schema).await?;
        tracing::debug!(tables = loaded.tables.len(), "Loaded database schema");
        Ok(loaded)
    }

    async fn execute_select(&self, sql: &str) -> AppResult<QueryResult> {
        let mut tx = self.pool.begin().await?;

        // Generated SQL never gets write access, whatever slipped past the guard.
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout_ms
        ))
        .execute(&mut *tx)
        .await?;

        let (fetched, truncated) =
            take_capped(sqlx::query(sql).fetch(&mut *tx), self.max_rows).await?;

        let mut result = QueryResult {
            columns: fetched.first().map(rows::column_names).unwrap_or_default(),
            rows: fetched.iter().map(rows::row_to_object).collect(),
            truncated,
        };

        if result.columns.is_empty() {
            let described = (&mut *tx).describe(sql).await?;
            result.columns = described
                .columns()
                .iter()
                .map(|c| sqlx::Column::name(c).to_string())
                .collect();
        }

        tx.rollback().await?;

        tracing::info!(
            rows = result.rows.len(),
            truncated = result.truncated,
            "Query executed successfully"
        );
        Ok(result)
    }

    async fn ping(&self) -> bool {
        health_check(&self.pool).await
    }
}

/// Pull at most `max_rows` items. The flag is set when the stream had more.
pub async fn take_capped<S>(
    mut stream: S,
    max_rows: usize,
) -> Result<(Vec<S::Ok>, bool), S::Error>
where
    S: TryStream + Unpin,
{
    let mut taken = Vec::new();
    while let Some(item) = stream.try_next().await? {
        if taken.len() >= max_rows {
            return Ok((taken, true));
        }
        taken.push(item);
    }
    Ok((taken, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio_test::{assert_err, assert_ok, block_on};

    fn numbers(n: u32) -> impl TryStream<Ok = u32, Error = String> + Unpin {
        stream::iter((1..=n).map(Ok))
    }

    #[test]
    fn test_exactly_max_rows_is_not_truncated() {
        let (rows, truncated) = assert_ok!(block_on(take_capped(numbers(3), 3)));
        assert_eq!(rows, vec![1, 2, 3]);
        assert!(!truncated);
    }

    #[test]
    fn test_one_over_max_rows_is_truncated() {
        let (rows, truncated) = assert_ok!(block_on(take_capped(numbers(4), 3)));
        assert_eq!(rows, vec![1, 2, 3]);
        assert!(truncated);
    }

    #[test]
    fn test_zero_max_rows() {
        let (rows, truncated) = assert_ok!(block_on(take_capped(numbers(2), 0)));
        assert!(rows.is_empty());
        assert!(truncated);

        let (rows, truncated) = assert_ok!(block_on(take_capped(numbers(0), 0)));
        assert!(rows.is_empty());
        assert!(!truncated);
    }

    #[test]
    fn test_stream_error_propagates() {
        let failing = stream::iter(vec![Ok(1), Err("connection reset".to_string()), Ok(3)]);
        let err = assert_err!(block_on(take_capped(failing, 10)));
        assert_eq!(err, "connection reset");
    }
}
