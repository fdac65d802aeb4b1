//! WebSocket chat.
//!
//! Clients connect to `GET /ws` and exchange JSON text frames tagged by
//! `type`. Each connection is one [`ChatSession`] with its own cached schema
//! and conversation history. Outgoing events go through an unbounded
//! channel drained by a writer task, so the session never holds the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::llm::Exchange;
use crate::services::{render, ChartSpec, QueryAnswer};
use crate::state::AppState;

/// Progress stages reported while a question is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Thinking,
    Generating,
    Executing,
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Welcome {
        session_id: String,
        content: String,
        tables: Vec<String>,
    },
    Status {
        stage: Stage,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sql: Option<String>,
    },
    Answer {
        sql: String,
        columns: Vec<String>,
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
        row_count: usize,
        truncated: bool,
        markdown: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        chart: Option<ChartSpec>,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sql: Option<String>,
    },
}

impl ServerEvent {
    fn status(stage: Stage, content: impl Into<String>) -> Self {
        ServerEvent::Status {
            stage,
            content: content.into(),
            sql: None,
        }
    }

    fn error(message: impl Into<String>, sql: Option<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
            sql,
        }
    }

    fn answer(answer: QueryAnswer) -> Self {
        let markdown = render::answer_markdown(&answer);
        ServerEvent::Answer {
            sql: answer.sql,
            columns: answer.columns,
            rows: answer.rows,
            row_count: answer.row_count,
            truncated: answer.truncated,
            markdown,
            chart: answer.chart,
        }
    }
}

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Question { content: String },
}

impl ClientEvent {
    /// Parse a text frame. Anything that is not a tagged event is taken as
    /// the question itself.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| ClientEvent::Question {
            content: text.to_string(),
        })
    }
}

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Per-connection chat state.
pub struct ChatSession {
    id: Uuid,
    state: AppState,
    events: EventSender,
    schema: Option<String>,
    history: Vec<Exchange>,
}

impl ChatSession {
    pub fn new(state: AppState, events: EventSender) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            events,
            schema: None,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    fn send(&self, event: ServerEvent) {
        // A closed channel means the client is gone; nothing left to tell it.
        let _ = self.events.send(event);
    }

    /// Load the schema and greet the client.
    pub async fn start(&mut self) {
        self.schema = match self.state.schema.describe().await {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Schema not loaded at chat start");
                None
            }
        };

        match self.state.schema.tables().await {
            Ok(tables) => {
                let names: Vec<String> = tables.into_iter().map(|t| t.name).collect();
                self.send(ServerEvent::Welcome {
                    session_id: self.id.to_string(),
                    content: render::welcome_message(&names),
                    tables: names,
                });
            }
            Err(e) => {
                self.send(ServerEvent::error(
                    format!("Initialization error: {}", e.client_message()),
                    None,
                ));
            }
        }
    }

    /// Process one question, streaming progress and the final answer.
    pub async fn handle(&mut self, event: ClientEvent) {
        let ClientEvent::Question { content } = event;
        let question = content.trim();
        if question.is_empty() {
            self.send(ServerEvent::error("No query provided", None));
            return;
        }
        tracing::info!(session = %self.id, question = %question, "Received user question");

        self.send(ServerEvent::status(Stage::Thinking, "Processing your request..."));

        let schema = match self.cached_schema().await {
            Some(schema) => schema,
            None => return,
        };

        self.send(ServerEvent::status(Stage::Generating, "Generating SQL query..."));
        let sql = match self
            .state
            .assistant
            .generate_sql(question, &schema, &self.history)
            .await
        {
            Ok(sql) => sql,
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "SQL generation failed");
                self.send(ServerEvent::error(e.client_message(), None));
                return;
            }
        };

        self.send(ServerEvent::Status {
            stage: Stage::Executing,
            content: format!("Executing SQL query:\n```sql\n{}\n```", sql),
            sql: Some(sql.clone()),
        });

        match self.state.assistant.execute(&sql).await {
            Ok(answer) => {
                self.remember(question, &sql);
                self.send(ServerEvent::answer(answer));
            }
            Err(e) => {
                let sql = e.sql().map(str::to_string).or(Some(sql));
                self.send(ServerEvent::error(e.client_message(), sql));
            }
        }
    }

    /// The schema from session start, fetched again if that failed.
    async fn cached_schema(&mut self) -> Option<String> {
        if let Some(schema) = &self.schema {
            return Some(schema.clone());
        }

        tracing::warn!(session = %self.id, "Schema not found in session, fetching again");
        match self.state.schema.describe().await {
            Ok(schema) => {
                self.schema = Some(schema.clone());
                Some(schema)
            }
            Err(e) => {
                self.send(ServerEvent::error(
                    format!("Could not load the database schema: {}", e.client_message()),
                    None,
                ));
                None
            }
        }
    }

    fn remember(&mut self, question: &str, sql: &str) {
        self.history.push(Exchange {
            question: question.to_string(),
            sql: sql.to_string(),
        });
        let excess = self.history.len().saturating_sub(self.state.history_turns);
        self.history.drain(..excess);
    }
}

/// WebSocket upgrade endpoint.
///
/// `GET /ws`
pub async fn chat(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize chat event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session = ChatSession::new(state, tx);
    tracing::info!(session = %session.id(), "Chat session opened");
    session.start().await;

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => session.handle(ClientEvent::parse(text.as_str())).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session = %session.id(), error = %e, "WebSocket receive failed");
                break;
            }
        }
    }

    tracing::info!(session = %session.id(), "Chat session closed");
    drop(session);
    let _ = writer.await;
}
