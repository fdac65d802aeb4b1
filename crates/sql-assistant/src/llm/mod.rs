//! Hosted language-model access.
//!
//! - [`client`]: the [`ChatModel`] seam and an OpenAI-compatible client
//! - [`prompt`]: prompt templates for SQL generation

pub mod client;
pub mod prompt;

pub use client::{ChatMessage, ChatModel, OpenAiClient, Role};
pub use prompt::{Exchange, PromptBuilder};
