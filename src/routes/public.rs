use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{any, get, post},
};

/// Public Router Module
///
/// Read-only route table queries. None of these depend on who is asking.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/tools
        // Navigation menu: non-hidden tools in activation order.
        .route("/api/tools", get(handlers::list_tools))
        // GET /api/tools/{title}/routes
        // Nested routes of one tool.
        .route("/api/tools/{title}/routes", get(handlers::get_tool_routes))
        // POST /api/paths
        // Builds a concrete path from a route title and parameter values.
        .route("/api/paths", post(handlers::build_path))
        // Anything else under /api
        // JSON 404 instead of falling through to the navigation shell.
        .route("/api", any(handlers::api_not_found))
        .route("/api/{*rest}", any(handlers::api_not_found))
}
