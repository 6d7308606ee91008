use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealergpt_api::background::memory_retention;
use dealergpt_api::config::ServerConfig;
use dealergpt_api::router::build_app_router;
use dealergpt_api::state::AppState;
use dealergpt_llm::{ChatCompletion, LlmConfig, OpenAiChatApi};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dealergpt_api=debug,dealergpt_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let llm_config = LlmConfig::from_env();
    if !llm_config.is_configured() {
        tracing::warn!("OPENAI_API_KEY is not set; every answer will be the fallback message");
    }
    let llm_timeout = llm_config.timeout;
    tracing::info!(
        model = %llm_config.model,
        base_url = %llm_config.base_url,
        "Loaded model configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = dealergpt_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    dealergpt_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    dealergpt_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Model client ---
    let llm: Arc<dyn ChatCompletion> =
        Arc::new(OpenAiChatApi::new(llm_config).expect("Failed to build HTTP client"));

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let retention_days = config.dealergpt.retention_days;
    let state = AppState::new(pool, config.clone(), llm, llm_timeout);

    // --- Background retention ---
    let retention_cancel = CancellationToken::new();
    let retention_handle = tokio::spawn(memory_retention::run(
        Arc::clone(&state.memory),
        retention_days,
        memory_retention::PRUNE_INTERVAL,
        retention_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    if tokio::time::timeout(shutdown_timeout, retention_handle).await.is_err() {
        tracing::warn!("Memory retention job did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
