use platform_shell::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    profile::{InMemoryProfileService, MemberApiProfileService, ProfileState},
    tools::RouteTable,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the route table and the
/// profile collaborator, then serves the shell.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging: RUST_LOG wins, otherwise debug for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "platform_shell=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Route table. Authoring defects stop startup here.
    let routes = Arc::new(RouteTable::platform().expect("FATAL: route table is invalid"));
    tracing::info!(tools = routes.tools().len(), "route table loaded");

    // 4. Profile collaborator
    let profiles: ProfileState = match &config.member_api_url {
        Some(url) => Arc::new(
            MemberApiProfileService::new(url, config.profile_timeout)
                .expect("FATAL: member api client could not be built. Check MEMBER_API_URL."),
        ),
        None => {
            tracing::warn!("MEMBER_API_URL not set, serving in-memory demo profiles");
            Arc::new(InMemoryProfileService::demo())
        }
    };

    // 5. State and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        routes,
        profiles,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: could not bind listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
