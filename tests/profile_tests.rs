use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
use platform_shell::{
    error::ProfileError,
    models::{MEMBER_ROLE, Profile},
    profile::{InMemoryProfileService, MemberApiProfileService, ProfileService},
};
use std::time::Duration;
use tokio::net::TcpListener;

// --- Mock Member API ---

async fn member(Path(handle): Path<String>) -> Result<Json<Profile>, StatusCode> {
    match handle.as_str() {
        "ghost" => Err(StatusCode::NOT_FOUND),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Ok(Json(Profile {
            user_id: 501,
            handle,
            roles: vec![MEMBER_ROLE.to_string()],
        })),
    }
}

/// Serves the mock on an ephemeral port and returns its base URL.
async fn spawn_member_api() -> String {
    let app = Router::new().route("/v5/members/{handle}", get(member));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v5")
}

fn client(base_url: &str) -> MemberApiProfileService {
    MemberApiProfileService::new(base_url, Duration::from_secs(2)).unwrap()
}

// --- Member API Client ---

#[tokio::test]
async fn test_member_api_returns_profile() {
    let base_url = spawn_member_api().await;
    let profile = client(&base_url).get_profile("alice").await.unwrap().unwrap();

    assert_eq!(profile.user_id, 501);
    assert_eq!(profile.handle, "alice");
    assert!(profile.is_member());
}

#[tokio::test]
async fn test_member_api_encodes_handle_as_one_segment() {
    let base_url = spawn_member_api().await;
    // Trailing slash on the base must not produce an empty segment.
    let profile = client(&format!("{base_url}/"))
        .get_profile("Some One")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.handle, "Some One");
}

#[tokio::test]
async fn test_member_api_unknown_member_is_none() {
    let base_url = spawn_member_api().await;
    assert!(client(&base_url).get_profile("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_member_api_server_error_is_upstream() {
    let base_url = spawn_member_api().await;
    let result = client(&base_url).get_profile("broken").await;
    assert!(matches!(result, Err(ProfileError::Upstream(500))));
}

#[tokio::test]
async fn test_member_api_unreachable_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(&format!("http://{addr}/v5")).get_profile("alice").await;
    assert!(matches!(result, Err(ProfileError::Transport(_))));
}

#[test]
fn test_member_api_rejects_invalid_base_url() {
    for base_url in ["not a url", "mailto:someone@example.com"] {
        assert!(matches!(
            MemberApiProfileService::new(base_url, Duration::from_secs(1)),
            Err(ProfileError::InvalidBaseUrl(_))
        ));
    }
}

// --- In-Memory Service ---

#[tokio::test]
async fn test_in_memory_lookup_is_case_insensitive() {
    let service = InMemoryProfileService::demo();
    let profile = service.get_profile("Customer").await.unwrap().unwrap();
    assert!(profile.is_customer());
    assert!(!profile.is_member());

    assert!(service.get_profile("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_in_memory_failing_service() {
    let service = InMemoryProfileService::new_failing();
    assert!(matches!(
        service.get_profile("member").await,
        Err(ProfileError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_demo_admin_counts_as_member_and_customer() {
    let admin = InMemoryProfileService::demo()
        .get_profile("admin")
        .await
        .unwrap()
        .unwrap();
    assert!(admin.is_member());
    assert!(admin.is_customer());
}
