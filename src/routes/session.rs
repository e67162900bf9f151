use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Session Router Module
///
/// Routes whose answer depends on the caller's session. Every handler here takes
/// the `SessionUser` extractor, which never rejects: signed-out and
/// still-loading sessions are answered, not refused.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // GET /api/session
        // The caller's session snapshot.
        .route("/api/session", get(handlers::get_session))
        // GET /api/resolve?path=...
        // One resolution pass, reported without redirecting.
        .route("/api/resolve", get(handlers::resolve_path))
}
