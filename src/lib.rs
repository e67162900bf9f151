use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Route resolution core.
pub mod context;
pub mod gate;
pub mod matcher;
pub mod models;
pub mod tools;

// Collaborators and ambient services.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod profile;

// HTTP route groups (public, session).
pub mod routes;
use routes::{public, session};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use context::{Directive, RouteContext};
pub use profile::{InMemoryProfileService, MemberApiProfileService, ProfileState};
pub use tools::RouteTable;

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::resolve_path, handlers::list_tools, handlers::get_tool_routes,
        handlers::build_path, handlers::get_session
    ),
    components(
        schemas(
            models::ResolutionResponse, models::RouteSummary, models::BuildPathRequest,
            models::BuildPathResponse, models::SessionState, models::Profile,
            models::DenyReason, models::OutcomeKind, models::ShellResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "platform-shell", description = "Platform route resolution API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state: the route table, the profile collaborator and the
/// configuration.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub profiles: ProfileState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ProfileState {
    fn from_ref(app_state: &AppState) -> ProfileState {
        app_state.profiles.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<RouteTable> {
    fn from_ref(app_state: &AppState) -> Arc<RouteTable> {
        app_state.routes.clone()
    }
}

/// create_router
///
/// Assembles the API routes, the navigation shell fallback and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session::session_routes())
        // Every other path is a page of the client and goes through resolution.
        .fallback(handlers::navigation_shell)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the `x-request-id` header so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
