//! Business logic services.
//!
//! Services sit between HTTP/WebSocket handlers and the database and model
//! seams, so both transports share one SQL chain.

mod assistant;
pub mod chart;
pub mod render;
mod schema;

pub use assistant::{AssistantService, QueryAnswer};
pub use chart::{ChartPoint, ChartSpec};
pub use schema::{SchemaService, TableSummary};
