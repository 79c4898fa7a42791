//! Metrics tracking middleware
//!
//! Counts requests and accumulates their latency for the `/metrics`
//! endpoint.

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Metrics tracking middleware
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    state.record_request(start.elapsed().as_micros() as u64);

    response
}
