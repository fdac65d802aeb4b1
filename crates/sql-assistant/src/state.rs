//! Application state for the SQL Assistant server.
//!
//! This module defines the shared application state that is
//! passed to all handlers via Axum's state management.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DataSource;
use crate::error::AppResult;
use crate::llm::{ChatModel, PromptBuilder};
use crate::services::{AssistantService, SchemaService};

/// Shared application state.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Database the questions are answered from
    pub data: Arc<dyn DataSource>,

    /// Schema description and table listing
    pub schema: SchemaService,

    /// The SQL chain
    pub assistant: AssistantService,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Previous exchanges kept per chat session
    pub history_turns: usize,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        data: Arc<dyn DataSource>,
        model: Arc<dyn ChatModel>,
        config: AppConfig,
        history_turns: usize,
    ) -> AppResult<Self> {
        let schema = SchemaService::new(data.clone(), config.hidden_table_list());
        let assistant = AssistantService::new(data.clone(), model, PromptBuilder::new(history_turns)?);

        Ok(Self {
            data,
            schema,
            assistant,
            config: Arc::new(config),
            history_turns,
            start_time: std::time::Instant::now(),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
