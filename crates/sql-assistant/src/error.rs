//! Error types for the SQL Assistant server.
//!
//! This module provides custom error types that implement `IntoResponse`
//! for seamless integration with Axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Generated SQL was rejected before execution
    #[error("Unsafe query: {0}")]
    UnsafeQuery(String),

    /// Generated SQL failed during execution
    #[error("Error executing query: {message}")]
    QueryFailed { message: String, sql: String },

    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsafeQuery(_) => StatusCode::BAD_REQUEST,
            AppError::QueryFailed { .. } => StatusCode::BAD_REQUEST,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients, without the variant prefix.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Serialization(_) => self.to_string(),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::UnsafeQuery(msg)
            | AppError::Llm(msg)
            | AppError::Internal(msg)
            | AppError::Config(msg)
            | AppError::Template(msg) => msg.clone(),
            AppError::QueryFailed { message, .. } => message.clone(),
        }
    }

    /// The SQL involved in the failure, when there was one.
    pub fn sql(&self) -> Option<&str> {
        match self {
            AppError::QueryFailed { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
            AppError::Config(msg) => tracing::error!(error = %msg, "Configuration error"),
            AppError::Serialization(e) => tracing::error!(error = %e, "Serialization error"),
            AppError::Template(msg) => tracing::error!(error = %msg, "Template error"),
            AppError::Llm(msg) => tracing::warn!(error = %msg, "LLM error"),
            _ => {}
        }

        let mut body = json!({
            "error": self.client_message(),
            "status": status.as_u16()
        });
        if let Some(sql) = self.sql() {
            body["sql"] = json!(sql);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<envy::Error> for AppError {
    fn from(err: envy::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Template(err.to_string())
    }
}
