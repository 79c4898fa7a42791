//! Root, health check and metrics handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use utoipa::ToSchema;
use wisnow_core::{ArticleSource, LlmClient, PoolStats};

/// Root response
#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    #[schema(example = "Wisnow Chatbot API is running")]
    pub message: String,
}

/// Root endpoint
///
/// Answers even when the database pool failed to initialize.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = RootResponse)
    )
)]
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Wisnow Chatbot API is running".to_string(),
    })
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub version: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub database: bool,
    pub llm_configured: bool,
}

/// Readiness probe - checks dependencies
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Database not reachable")
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let checks = ReadinessChecks {
        database: state.articles.is_healthy().await,
        llm_configured: state.llm_client.is_configured(),
    };
    let ready = checks.database;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

/// JSON metrics response
#[derive(Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub average_latency_ms: f64,
    pub chat_requests: u64,
    pub chat_failures: u64,
    pub db_pool: DbPoolMetrics,
}

#[derive(Serialize)]
pub struct DbPoolMetrics {
    pub initialized: bool,
    pub size: u32,
    pub idle: usize,
    pub max: u32,
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.articles.pool_stats();
    let PoolStats { size, idle } = pool.unwrap_or_default();

    Json(MetricsResponse {
        uptime_seconds: state.uptime_secs(),
        total_requests: state.get_request_count(),
        average_latency_ms: state.average_latency_ms(),
        chat_requests: state.chat_count.load(Ordering::SeqCst),
        chat_failures: state.chat_failures.load(Ordering::SeqCst),
        db_pool: DbPoolMetrics {
            initialized: pool.is_some(),
            size,
            idle,
            max: state.config.database.pool_max,
        },
    })
}
