//! Prompt templates for SQL generation, rendered with minijinja.

use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use super::client::ChatMessage;
use crate::error::AppResult;

/// System message sent ahead of every conversation.
pub const SYSTEM_PROMPT: &str = "You are an SQL expert specializing in PostgreSQL.";

const SQL_PROMPT_NAME: &str = "sql_prompt";

const SQL_PROMPT: &str = r#"You are an expert SQL assistant that converts natural language questions to PostgreSQL queries.

Based on the database schema below, write a SELECT query that answers the user's question.
Return ONLY the SQL query without any explanation, comments, or markdown formatting.

Database schema (this is the exact and current schema, use only these tables and columns):
{{ schema }}

Important rules:
1. Generate ONLY SELECT queries.
2. Do not add comments, backticks or markdown formatting.
3. Use only tables and columns that exist in the schema above.
4. Make sure the query can be executed directly in PostgreSQL.
5. Use aliases for column names to make results more readable.
6. Add an ORDER BY clause when appropriate.
7. Limit results to {{ default_limit }} rows unless the question asks otherwise.
8. Check carefully that every table and column you use exists in the schema.

User question: {{ question }}

SQL query (IMPORTANT: return ONLY the SQL query):"#;

/// Row limit the model is asked to apply by default.
const DEFAULT_LIMIT: usize = 100;

/// A previous question and the SQL that answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub sql: String,
}

/// Builds the message list sent to the model.
pub struct PromptBuilder {
    env: Environment<'static>,
    history_turns: usize,
}

impl PromptBuilder {
    pub fn new(history_turns: usize) -> AppResult<Self> {
        let mut env = Environment::new();
        env.add_template(SQL_PROMPT_NAME, SQL_PROMPT)?;
        Ok(Self { env, history_turns })
    }

    /// Render the user prompt for one question.
    pub fn render_question(&self, schema: &str, question: &str) -> AppResult<String> {
        let template = self.env.get_template(SQL_PROMPT_NAME)?;
        Ok(template.render(context! {
            schema => schema,
            question => question,
            default_limit => DEFAULT_LIMIT,
        })?)
    }

    /// System message, then the most recent `history_turns` exchanges, then
    /// the rendered question.
    pub fn build(
        &self,
        schema: &str,
        question: &str,
        history: &[Exchange],
    ) -> AppResult<Vec<ChatMessage>> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];

        let skip = history.len().saturating_sub(self.history_turns);
        for exchange in &history[skip..] {
            messages.push(ChatMessage::user(exchange.question.clone()));
            messages.push(ChatMessage::assistant(exchange.sql.clone()));
        }

        messages.push(ChatMessage::user(self.render_question(schema, question)?));
        Ok(messages)
    }
}
