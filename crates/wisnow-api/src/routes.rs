//! API route definitions

use crate::handlers::{chat, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Root, probe and metrics routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
}

/// Chat routes
pub fn chat_routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat::chat_handler))
}
