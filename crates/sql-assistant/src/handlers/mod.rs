//! HTTP and WebSocket handlers for the SQL Assistant.
//!
//! This module contains all route handlers organized by concern.

pub mod chat;
pub mod health;
pub mod index;
pub mod query;
pub mod tables;

pub use health::{api_health, health_check};
