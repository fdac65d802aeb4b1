//! Configuration module for the SQL Assistant server.
//!
//! This module provides configuration loading from environment variables
//! using the `envy` crate for type-safe environment variable parsing.
//! A `.env` file is honoured through `dotenvy` in `main`.

mod app;
mod database;
mod llm;

pub use app::AppConfig;
pub use database::{redact_url, DatabaseConfig};
pub use llm::LlmConfig;
