//! The SQL chain: question → prompt → model → sanitized SQL → rows.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use super::chart::{suggest_chart, ChartSpec};
use crate::db::{DataSource, QueryResult};
use crate::error::{AppError, AppResult};
use crate::llm::{ChatModel, Exchange, PromptBuilder};
use crate::sql::clean_sql;

static MISSING_RELATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"relation "([^"]+)" does not exist"#).expect("missing relation regex")
});

/// A generated query together with its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub row_count: usize,
    pub truncated: bool,
    pub chart: Option<ChartSpec>,
}

impl QueryAnswer {
    fn new(sql: String, result: QueryResult) -> Self {
        let chart = suggest_chart(&result.columns, &result.rows);
        Self {
            sql,
            row_count: result.row_count(),
            columns: result.columns,
            rows: result.rows,
            truncated: result.truncated,
            chart,
        }
    }
}

/// Service answering natural-language questions with SQL.
#[derive(Clone)]
pub struct AssistantService {
    data: Arc<dyn DataSource>,
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptBuilder>,
}

impl AssistantService {
    pub fn new(
        data: Arc<dyn DataSource>,
        model: Arc<dyn ChatModel>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            data,
            model,
            prompts: Arc::new(prompts),
        }
    }

    /// Ask the model for SQL answering `question` against `schema`.
    pub async fn generate_sql(
        &self,
        question: &str,
        schema: &str,
        history: &[Exchange],
    ) -> AppResult<String> {
        let messages = self.prompts.build(schema, question, history)?;
        let reply = self.model.complete(&messages).await?;
        tracing::debug!(reply = %reply, "Model reply");

        let sql = clean_sql(&reply)?;
        tracing::info!(sql = %sql, "Generated SQL query");
        Ok(sql)
    }

    /// Execute sanitized SQL, turning database failures into
    /// [`AppError::QueryFailed`] with a helpful message.
    pub async fn execute(&self, sql: &str) -> AppResult<QueryAnswer> {
        match self.data.execute_select(sql).await {
            Ok(result) => Ok(QueryAnswer::new(sql.to_string(), result)),
            Err(AppError::Database(e)) => {
                let message = database_message(&e);
                tracing::warn!(sql = %sql, error = %message, "Generated query failed");
                Err(AppError::QueryFailed {
                    message: self.explain_failure(message).await,
                    sql: sql.to_string(),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Full round trip with a freshly loaded schema.
    pub async fn ask(&self, question: &str, history: &[Exchange]) -> AppResult<QueryAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::BadRequest("No query provided".to_string()));
        }
        tracing::info!(question = %question, "Received question");

        let schema = self.data.schema().await?.to_ddl();
        let sql = self.generate_sql(question, &schema, history).await?;
        self.execute(&sql).await
    }

    /// Rewrite "relation does not exist" into a hint listing real tables.
    async fn explain_failure(&self, message: String) -> String {
        let Some(missing) = missing_relation(&message) else {
            return message;
        };

        let mut explained = format!("Table '{}' does not exist.", missing);
        match self.data.schema().await {
            Ok(schema) if !schema.tables.is_empty() => {
                explained.push_str(&format!(
                    " Available tables: {}",
                    schema.table_names().join(", ")
                ));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Could not list tables for error hint"),
        }
        explained
    }
}

fn database_message(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

/// Name of the relation in a `relation "x" does not exist` message.
pub fn missing_relation(message: &str) -> Option<String> {
    MISSING_RELATION
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::testing::{FakeDataSource, FakeModel};
    use serde_json::json;

    fn service(data: FakeDataSource, model: FakeModel) -> (AssistantService, Arc<FakeDataSource>, Arc<FakeModel>) {
        let data = Arc::new(data);
        let model = Arc::new(model);
        let service = AssistantService::new(
            data.clone(),
            model.clone(),
            PromptBuilder::new(4).unwrap(),
        );
        (service, data, model)
    }

    #[test]
    fn test_missing_relation() {
        assert_eq!(
            missing_relation(r#"relation "projekts" does not exist"#),
            Some("projekts".to_string())
        );
        assert_eq!(missing_relation("syntax error at or near \"FORM\""), None);
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let (service, data, model) = service(
            FakeDataSource::sample().with_result(FakeDataSource::status_counts()),
            FakeModel::replying(&["```sql\nSELECT status, count(*) AS total FROM projects GROUP BY status;\n```"]),
        );

        let answer = service.ask("How many projects per status?", &[]).await.unwrap();
        assert_eq!(answer.sql, "SELECT status, count(*) AS total FROM projects GROUP BY status");
        assert_eq!(answer.row_count, 3);
        assert_eq!(answer.columns, vec!["status", "total"]);
        assert!(answer.chart.is_some());

        assert_eq!(data.executed(), vec![answer.sql.clone()]);
        let prompts = model.seen();
        assert_eq!(prompts.len(), 1);
        let last = prompts[0].last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("CREATE TABLE projects"));
        assert!(last.content.contains("How many projects per status?"));
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let (service, _, model) = service(FakeDataSource::sample(), FakeModel::replying(&[]));
        let err = service.ask("   ", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "No query provided"));
        assert!(model.seen().is_empty());
    }

    #[tokio::test]
    async fn test_unsafe_reply_is_not_executed() {
        let (service, data, _) = service(
            FakeDataSource::sample(),
            FakeModel::replying(&["DROP TABLE projects"]),
        );
        let err = service.ask("drop everything", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::UnsafeQuery(_)));
        assert!(data.executed().is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_hint() {
        let (service, _, _) = service(
            FakeDataSource::sample().with_error(r#"relation "projekts" does not exist"#),
            FakeModel::replying(&["SELECT * FROM projekts"]),
        );
        let err = service.ask("list projects", &[]).await.unwrap_err();
        match err {
            AppError::QueryFailed { message, sql } => {
                assert_eq!(
                    message,
                    "Table 'projekts' does not exist. Available tables: projects, technologies, users"
                );
                assert_eq!(sql, "SELECT * FROM projekts");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_database_errors_keep_message() {
        let (service, _, _) = service(
            FakeDataSource::sample().with_error("column \"nme\" does not exist"),
            FakeModel::replying(&["SELECT nme FROM projects"]),
        );
        let err = service.ask("names", &[]).await.unwrap_err();
        assert!(err.client_message().contains("column \"nme\" does not exist"));
        assert_eq!(err.sql(), Some("SELECT nme FROM projects"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let (service, data, _) = service(FakeDataSource::sample(), FakeModel::failing("upstream down"));
        let err = service.ask("anything", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(data.executed().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_forwarded() {
        let (service, _, model) = service(
            FakeDataSource::sample(),
            FakeModel::replying(&["SELECT name FROM projects WHERE id = 1"]),
        );
        let history = vec![Exchange {
            question: "show projects".to_string(),
            sql: "SELECT * FROM projects LIMIT 100".to_string(),
        }];
        service
            .generate_sql("only the first one", "schema", &history)
            .await
            .unwrap();

        let seen = model.seen();
        assert_eq!(seen[0].len(), 4);
        assert_eq!(seen[0][2].content, "SELECT * FROM projects LIMIT 100");
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let (service, _, _) = service(
            FakeDataSource::sample().with_result(QueryResult {
                columns: vec!["id".to_string()],
                rows: vec![],
                truncated: false,
            }),
            FakeModel::replying(&[]),
        );
        let answer = service.execute("SELECT id FROM projects WHERE false").await.unwrap();
        assert_eq!(answer.columns, vec!["id"]);
        assert_eq!(answer.row_count, 0);
        assert_eq!(answer.chart, None);
        assert_eq!(json!(answer.rows), json!([]));
    }
}
