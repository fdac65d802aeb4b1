//! In-memory fakes for the database and model seams.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::db::{ColumnInfo, DataSource, DatabaseSchema, ForeignKey, QueryResult, TableInfo};
use crate::error::{AppError, AppResult};
use crate::llm::{ChatMessage, ChatModel};

pub struct FakeDataSource {
    schema: DatabaseSchema,
    result: QueryResult,
    error: Option<String>,
    healthy: bool,
    executed: Mutex<Vec<String>>,
}

fn column(name: &str, data_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: data_type.to_string(),
        default: None,
        nullable: true,
    }
}

impl FakeDataSource {
    /// Three tables: projects, technologies, users.
    pub fn sample() -> Self {
        let schema = DatabaseSchema {
            tables: vec![
                TableInfo {
                    name: "projects".to_string(),
                    columns: vec![
                        column("id", "integer"),
                        column("name", "text"),
                        column("started_at", "date"),
                    ],
                },
                TableInfo {
                    name: "technologies".to_string(),
                    columns: vec![column("project_id", "integer"), column("name", "text")],
                },
                TableInfo {
                    name: "users".to_string(),
                    columns: vec![column("email", "text")],
                },
            ],
            foreign_keys: vec![ForeignKey {
                table: "technologies".to_string(),
                column: "project_id".to_string(),
                foreign_table: "projects".to_string(),
                foreign_column: "id".to_string(),
            }],
        };

        Self {
            schema,
            result: QueryResult::default(),
            error: None,
            healthy: true,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// No tables at all.
    pub fn empty() -> Self {
        Self {
            schema: DatabaseSchema::default(),
            ..Self::sample()
        }
    }

    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.result = result;
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// `status, total` with three rows.
    pub fn status_counts() -> QueryResult {
        let rows: Vec<Map<String, Value>> = [("active", 4), ("done", 7), ("planned", 2)]
            .iter()
            .map(|(status, total)| {
                let mut row = Map::new();
                row.insert("status".to_string(), json!(status));
                row.insert("total".to_string(), json!(total));
                row
            })
            .collect();
        QueryResult {
            columns: vec!["status".to_string(), "total".to_string()],
            rows,
            truncated: false,
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for FakeDataSource {
    async fn schema(&self) -> AppResult<DatabaseSchema> {
        Ok(self.schema.clone())
    }

    async fn execute_select(&self, sql: &str) -> AppResult<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        match &self.error {
            Some(message) => Err(AppError::Database(sqlx::Error::Protocol(message.clone()))),
            None => Ok(self.result.clone()),
        }
    }

    async fn ping(&self) -> bool {
        self.healthy
    }
}

pub struct FakeModel {
    replies: Mutex<VecDeque<AppResult<String>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    /// Replies in order; errors once they run out.
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(AppError::Llm(message.to_string()))])),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every conversation sent to the model.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted reply".to_string())))
    }
}
