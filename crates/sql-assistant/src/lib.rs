//! SQL Assistant Library
//!
//! Answers natural-language questions about a PostgreSQL database by asking
//! a hosted language model for SQL, sanitizing it and running it read-only.
//!
//! ## Architecture
//!
//! Clients talk HTTP (`/api/tables`, `/api/query`) or WebSocket (`/ws`).
//! Both transports share the same SQL chain in [`services`], which reaches
//! the outside world through two seams: [`db::DataSource`] for PostgreSQL and
//! [`llm::ChatModel`] for the hosted model.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`db`]: Pool, schema introspection and read-only execution
//! - [`error`]: Custom error types with Axum integration
//! - [`handlers`]: HTTP and WebSocket handlers
//! - [`llm`]: Chat-completion client and prompt templates
//! - [`services`]: The SQL chain, rendering and chart suggestions
//! - [`sql`]: Cleanup and validation of generated SQL
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sql_assistant::{
//!     config::{AppConfig, DatabaseConfig, LlmConfig},
//!     db::{create_pool, PgDataSource},
//!     llm::OpenAiClient,
//!     routes::build_router,
//!     state::AppState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db_config = DatabaseConfig::from_env()?;
//!     let llm_config = LlmConfig::from_env()?;
//!     let pool = create_pool(&db_config).await?;
//!     let state = AppState::new(
//!         Arc::new(PgDataSource::new(pool, &db_config)),
//!         Arc::new(OpenAiClient::new(&llm_config)?),
//!         AppConfig::from_env()?,
//!         llm_config.history_turns,
//!     )?;
//!     let app = build_router(state);
//!     // ... bind and serve
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod result_ext;
pub mod routes;
pub mod services;
pub mod sql;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AppError, AppResult};
pub use result_ext::ResultExt;
