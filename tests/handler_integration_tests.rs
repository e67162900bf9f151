use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use platform_shell::{
    AppState, create_router,
    auth::LOCAL_HANDLE_HEADER,
    config::AppConfig,
    context::RETURN_URL_PARAM,
    models::{
        BuildPathResponse, ErrorResponse, OutcomeKind, ResolutionResponse, RouteSummary,
        SessionState, ShellResponse,
    },
    profile::{InMemoryProfileService, ProfileState},
    tools::RouteTable,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

// --- Test Utilities ---

fn app_with(profiles: ProfileState) -> Router {
    create_router(AppState {
        routes: Arc::new(RouteTable::platform().unwrap()),
        profiles,
        config: AppConfig::default(),
    })
}

fn app() -> Router {
    app_with(Arc::new(InMemoryProfileService::demo()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get(uri: &str, handle: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(handle) = handle {
        builder = builder.header(LOCAL_HANDLE_HEADER, handle);
    }
    builder.body(Body::empty()).unwrap()
}

fn json<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

// --- Public API ---

#[tokio::test]
async fn test_health_check() {
    let (status, _, body) = send(app(), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_list_tools_excludes_hidden() {
    let (status, _, body) = send(app(), get("/api/tools", None)).await;
    assert_eq!(status, StatusCode::OK);

    let tools: Vec<RouteSummary> = json(&body);
    let titles: Vec<&str> = tools.iter().map(|tool| tool.title.as_str()).collect();
    assert_eq!(titles.first(), Some(&"Challenges"));
    assert_eq!(titles.last(), Some(&"Home"));
    assert!(!titles.contains(&"Onboarding"));
}

#[tokio::test]
async fn test_tool_routes_lists_children() {
    let (status, _, body) = send(app(), get("/api/tools/Work/routes", None)).await;
    assert_eq!(status, StatusCode::OK);

    let children: Vec<RouteSummary> = json(&body);
    assert_eq!(children.len(), 5);
    assert!(children.iter().any(|child| child.title == "Review" && child.hidden));

    let (status, _, _) = send(app(), get("/api/tools/Nope/routes", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_build_path_endpoint() {
    let post = |payload: serde_json::Value| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/paths")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    };

    let (status, _, body) = send(
        app(),
        post(serde_json::json!({ "title": "Badge Detail", "params": { "id": "42" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let built: BuildPathResponse = json(&body);
    assert_eq!(built.path, "/gamification-admin/badge-detail/42");

    let (status, _, _) = send(app(), post(serde_json::json!({ "title": "Nowhere" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(app(), post(serde_json::json!({ "title": "Badge Detail" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// --- Session API ---

#[tokio::test]
async fn test_session_endpoint() {
    let (_, _, body) = send(app(), get("/api/session", None)).await;
    assert_eq!(json::<SessionState>(&body), SessionState::anonymous());

    let (_, _, body) = send(app(), get("/api/session", Some("badger"))).await;
    let session: SessionState = json(&body);
    assert_eq!(session.profile.unwrap().user_id, 1003);
}

#[tokio::test]
async fn test_resolve_reports_params_and_titles() {
    let (status, _, body) = send(
        app(),
        get("/api/resolve?path=/learn/freeCodeCamp/web-design/", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let resolution: ResolutionResponse = json(&body);
    assert_eq!(resolution.path, "/learn/freeCodeCamp/web-design");
    assert_eq!(resolution.active_tool.as_deref(), Some("Topcoder Academy"));
    assert_eq!(resolution.titles, ["Topcoder Academy", "Certification Details"]);
    assert_eq!(resolution.outcome, OutcomeKind::Allow);
    assert_eq!(
        resolution.params.get("provider").map(String::as_str),
        Some("freeCodeCamp")
    );
    assert!(!resolution.is_root);
}

#[tokio::test]
async fn test_resolve_reports_denial_without_redirecting() {
    let (status, _, body) = send(app(), get("/api/resolve?path=/work", None)).await;
    assert_eq!(status, StatusCode::OK);

    let resolution: ResolutionResponse = json(&body);
    assert_eq!(resolution.outcome, OutcomeKind::Deny);
    assert!(resolution.redirect_to.unwrap().contains(RETURN_URL_PARAM));
}

// --- Navigation Shell ---

#[tokio::test]
async fn test_shell_redirects_anonymous_to_login() {
    let (status, headers, _) = send(app(), get("/work", None)).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

    let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    let url = Url::parse(location).unwrap();
    assert_eq!(url.host_str(), AppConfig::default().login_url.host_str());
    assert!(
        url.query_pairs()
            .any(|(key, value)| key == RETURN_URL_PARAM && value == "/work")
    );
}

#[tokio::test]
async fn test_shell_renders_for_customer() {
    let (status, _, body) = send(app(), get("/work", Some("customer"))).await;
    assert_eq!(status, StatusCode::OK);

    let shell: ShellResponse = json(&body);
    assert_eq!(shell.directive, "render");
    assert_eq!(shell.tool.as_deref(), Some("Work"));
    assert_eq!(shell.element.as_deref(), Some("work-dashboard"));
}

#[tokio::test]
async fn test_shell_redirects_insufficient_role_to_unauthorized() {
    let (status, headers, _) = send(app(), get("/gamification-admin", Some("member"))).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/");

    let (status, _, _) = send(app(), get("/gamification-admin", Some("badger"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_shell_not_found_for_tool_without_element() {
    let (status, _, body) = send(app(), get("/certificates", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let shell: ShellResponse = json(&body);
    assert_eq!(shell.directive, "not-found");
    assert_eq!(shell.tool.as_deref(), Some("Certificates"));
}

#[tokio::test]
async fn test_shell_loading_while_profile_unavailable() {
    let app = app_with(Arc::new(InMemoryProfileService::new_failing()));
    let (status, _, body) = send(app, get("/work", Some("customer"))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let shell: ShellResponse = json(&body);
    assert_eq!(shell.directive, "loading");
}

#[tokio::test]
async fn test_shell_public_pages_render_while_profile_unavailable() {
    let app = app_with(Arc::new(InMemoryProfileService::new_failing()));
    let (status, _, body) = send(app, get("/challenges/30012345", Some("customer"))).await;
    assert_eq!(status, StatusCode::OK);

    let shell: ShellResponse = json(&body);
    assert_eq!(shell.element.as_deref(), Some("challenge-details"));
    assert_eq!(shell.params.get("challengeId").map(String::as_str), Some("30012345"));
}

#[tokio::test]
async fn test_shell_lists_nested_routes() {
    let (status, _, body) = send(app(), get("/learn/academy-extra", None)).await;
    assert_eq!(status, StatusCode::OK);

    // Nothing below the tool root consumes the segment, so the layout renders.
    let shell: ShellResponse = json(&body);
    assert_eq!(shell.element.as_deref(), Some("learn-layout"));
    assert_eq!(shell.children.len(), 5);
}

#[tokio::test]
async fn test_shell_and_resolve_decode_paths_alike() {
    let (status, _, body) = send(app(), get("/learn/free%20Code/web-design", None)).await;
    assert_eq!(status, StatusCode::OK);
    let shell: ShellResponse = json(&body);

    let (_, _, body) = send(
        app(),
        get("/api/resolve?path=/learn/free%20Code/web-design", None),
    )
    .await;
    let resolution: ResolutionResponse = json(&body);

    assert_eq!(
        shell.params.get("provider").map(String::as_str),
        Some("free Code")
    );
    assert_eq!(shell.params, resolution.params);
    assert_eq!(shell.element, resolution.element);
}

#[tokio::test]
async fn test_shell_keeps_encoded_slash_inside_segment() {
    let (status, _, body) = send(app(), get("/challenges/a%2Fb", None)).await;
    assert_eq!(status, StatusCode::OK);

    let shell: ShellResponse = json(&body);
    assert_eq!(shell.element.as_deref(), Some("challenge-details"));
    assert_eq!(shell.params.get("challengeId").map(String::as_str), Some("a/b"));
}

#[tokio::test]
async fn test_shell_login_redirect_keeps_query() {
    let (status, headers, _) = send(app(), get("/work?step=2", None)).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

    let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    let url = Url::parse(location).unwrap();
    assert!(
        url.query_pairs()
            .any(|(key, value)| key == RETURN_URL_PARAM && value == "/work?step=2")
    );
}

// --- Unknown API Paths ---

#[tokio::test]
async fn test_unknown_api_path_is_json_not_found() {
    for uri in ["/api/nope", "/api/tools/Work/extra/deep", "/api"] {
        let (status, _, body) = send(app(), get(uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");

        let error: ErrorResponse = json(&body);
        assert!(error.error.contains(uri));
    }
}
