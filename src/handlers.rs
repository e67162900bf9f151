use crate::{
    AppState,
    auth::SessionUser,
    context::{Directive, RouteContext},
    error::PathBuildError,
    matcher::MatchOutcome,
    models::{
        AccessOutcome, BuildPathRequest, BuildPathResponse, ErrorResponse, OutcomeKind,
        ResolutionResponse, RouteSummary, SessionState, ShellResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

// --- Query Structs ---

/// ResolveQuery
///
/// Query parameters of `GET /api/resolve`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResolveQuery {
    /// Path to resolve, e.g. `/learn/freeCodeCamp/web-design`.
    pub path: String,
}

// --- Handlers ---

/// resolve_path
///
/// Runs one resolution pass for `path` and the caller's session and reports the
/// full outcome without redirecting.
#[utoipa::path(
    get,
    path = "/api/resolve",
    params(ResolveQuery),
    responses((status = 200, description = "Resolution", body = ResolutionResponse))
)]
pub async fn resolve_path(
    SessionUser(session): SessionUser,
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolutionResponse> {
    let mut context = RouteContext::new(state.routes.clone(), state.config.redirects());
    context.navigate(&query.path, &session);
    Json(resolution_response(&context))
}

/// list_tools
///
/// Tools shown in navigation, in activation order. Hidden tools are left out.
#[utoipa::path(
    get,
    path = "/api/tools",
    responses((status = 200, description = "Navigation", body = [RouteSummary]))
)]
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(
        state
            .routes
            .navigation()
            .map(|tool| RouteSummary::from(tool.as_ref()))
            .collect(),
    )
}

/// get_tool_routes
///
/// Direct child routes of a tool, hidden ones included, for tools rendering
/// their own nested routes.
#[utoipa::path(
    get,
    path = "/api/tools/{title}/routes",
    params(("title" = String, Path, description = "Tool title")),
    responses(
        (status = 200, description = "Child routes", body = [RouteSummary]),
        (status = 404, description = "Unknown tool")
    )
)]
pub async fn get_tool_routes(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<RouteSummary>>, StatusCode> {
    let context = RouteContext::new(state.routes.clone(), state.config.redirects());
    let children = context.child_routes(&title).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(
        children
            .iter()
            .map(|child| RouteSummary::from(child.as_ref()))
            .collect(),
    ))
}

/// build_path
///
/// Builds a concrete path for the route carrying `title`.
#[utoipa::path(
    post,
    path = "/api/paths",
    request_body = BuildPathRequest,
    responses(
        (status = 200, description = "Built path", body = BuildPathResponse),
        (status = 404, description = "Unknown route title"),
        (status = 422, description = "Missing or invalid parameter")
    )
)]
pub async fn build_path(
    State(state): State<AppState>,
    Json(payload): Json<BuildPathRequest>,
) -> Result<Json<BuildPathResponse>, StatusCode> {
    let context = RouteContext::new(state.routes.clone(), state.config.redirects());
    match context.path_for_title(&payload.title, &payload.params) {
        Ok(path) => Ok(Json(BuildPathResponse { path })),
        Err(PathBuildError::UnknownRoute(_) | PathBuildError::ForeignNode) => {
            Err(StatusCode::NOT_FOUND)
        }
        Err(PathBuildError::MissingParam(_) | PathBuildError::InvalidParam { .. }) => {
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// get_session
///
/// The caller's session as seen by the gate.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Session", body = SessionState))
)]
pub async fn get_session(SessionUser(session): SessionUser) -> Json<SessionState> {
    Json(session)
}

/// navigation_shell
///
/// Fallback for every path the API does not own: resolves it as a page of the
/// client and answers with a redirect, a loading state, not-found or the page to
/// render.
pub async fn navigation_shell(
    SessionUser(session): SessionUser,
    State(state): State<AppState>,
    uri: Uri,
) -> Response {
    // Keep the query so a login redirect can return to it.
    let requested = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());

    let mut context = RouteContext::new(state.routes.clone(), state.config.redirects());
    let path = context.navigate(requested, &session).path.clone();

    let Some(directive) = context.directive() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    match directive {
        Directive::Redirect { target, reason } => {
            info!(%path, %reason, %target, "navigation denied");
            Redirect::temporary(&target).into_response()
        }
        Directive::Loading => (
            StatusCode::ACCEPTED,
            Json(ShellResponse {
                directive: "loading".to_string(),
                path,
                tool: context.active_tool_title().map(str::to_string),
                element: None,
                params: BTreeMap::new(),
                children: Vec::new(),
            }),
        )
            .into_response(),
        Directive::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ShellResponse {
                directive: "not-found".to_string(),
                path,
                tool: context.active_tool_title().map(str::to_string),
                element: None,
                params: BTreeMap::new(),
                children: Vec::new(),
            }),
        )
            .into_response(),
        Directive::Render {
            tool,
            element,
            params,
            children,
            ..
        } => (
            StatusCode::OK,
            Json(ShellResponse {
                directive: "render".to_string(),
                path,
                tool: Some(tool),
                element: Some(element.to_string()),
                params,
                children: children
                    .iter()
                    .map(|child| RouteSummary::from(child.as_ref()))
                    .collect(),
            }),
        )
            .into_response(),
    }
}

/// api_not_found
///
/// Unknown paths under `/api`. They are API typos, not pages, so they never
/// reach the navigation shell.
pub async fn api_not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("no api route for {}", uri.path()),
        }),
    )
}

/// resolution_response
///
/// Flattens the context's current resolution into the API payload.
pub fn resolution_response(context: &RouteContext) -> ResolutionResponse {
    let Some(resolution) = context.resolution() else {
        return ResolutionResponse {
            path: String::new(),
            active_tool: None,
            titles: Vec::new(),
            element: None,
            params: BTreeMap::new(),
            rest: String::new(),
            outcome: OutcomeKind::NotFound,
            deny_reason: None,
            redirect_to: None,
            is_root: false,
        };
    };

    let (outcome, deny_reason) = match resolution.access {
        None => (OutcomeKind::NotFound, None),
        Some(AccessOutcome::Allow) => (OutcomeKind::Allow, None),
        Some(AccessOutcome::Pending) => (OutcomeKind::Pending, None),
        Some(AccessOutcome::Deny(reason)) => (OutcomeKind::Deny, Some(reason)),
    };

    let redirect_to = match context.directive() {
        Some(Directive::Redirect { target, .. }) => Some(target),
        _ => None,
    };

    let (titles, element, params, rest) = match &resolution.outcome {
        MatchOutcome::Matched(route) => (
            route.titles(),
            Some(route.element.to_string()),
            route.params.clone(),
            route.rest.clone(),
        ),
        MatchOutcome::NoMatch { .. } => (Vec::new(), None, BTreeMap::new(), String::new()),
    };

    ResolutionResponse {
        path: resolution.path.clone(),
        active_tool: context.active_tool_title().map(str::to_string),
        titles,
        element,
        params,
        rest,
        outcome,
        deny_reason,
        redirect_to,
        is_root: context.is_root_route(),
    }
}
