//! Wisnow API - HTTP server
//!
//! Serves the knowledge-base chatbot over JSON.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "Wisnow Chatbot API", description = "Knowledge-base question answering"),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::chat::chat_handler,
    ),
    components(schemas(
        handlers::chat::ChatRequest,
        handlers::chat::ChatResponse,
        handlers::health::RootResponse,
        handlers::health::HealthResponse,
        error::ApiError,
    )),
    tags(
        (name = "chat", description = "Question answering"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::chat_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Empty origin list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Router backed by an unreachable database and an unconfigured backend
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    use wisnow_core::{AppConfig, ArticleStore};
    use wisnow_rag::GeminiClient;

    let config = AppConfig::default();
    let store = ArticleStore::uninitialized(&config.database.articles_table);
    let llm_client =
        GeminiClient::from_config(&config.llm).expect("default HTTP client should build");

    create_router(Arc::new(AppState::new(
        config,
        Arc::new(store),
        Arc::new(llm_client),
    )))
}
