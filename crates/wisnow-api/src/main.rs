//! Wisnow API Server
//!
//! REST API server for the Wisnow knowledge-base chatbot.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use wisnow_api::{create_router, state::AppState};
use wisnow_core::config::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config_path = std::env::var("WISNOW_CONFIG").ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::initialize(config).await?);

    // Create router
    let app = create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Wisnow API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "wisnow_api={0},wisnow_core={0},wisnow_rag={0},tower_http={0}",
            logging.level
        )
        .into()
    });

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
