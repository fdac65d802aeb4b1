//! Router assembly.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - the chat page may be served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health));

    // Schema routes
    let schema_routes = Router::new()
        .route("/api/tables", get(handlers::tables::list_tables))
        .route("/api/schema", get(handlers::tables::get_schema));

    // Question routes
    let query_routes = Router::new().route("/api/query", post(handlers::query::process_query));

    // Chat UI and its WebSocket
    let chat_routes = Router::new()
        .route("/", get(handlers::index::index))
        .route("/ws", get(handlers::chat::chat));

    Router::new()
        .merge(health_routes)
        .merge(schema_routes)
        .merge(query_routes)
        .merge(chat_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
