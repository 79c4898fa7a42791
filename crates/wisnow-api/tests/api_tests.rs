//! API Integration Tests
//!
//! The router runs against in-memory article sources and LLM clients, so
//! no database or Gemini key is needed.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use wisnow_api::{create_router, create_router_for_testing, state::AppState};
use wisnow_core::{
    AppConfig, Article, ArticleLookup, ArticleSource, ArticleStore, LlmClient, LlmConfig, Result,
    WisnowError,
};
use wisnow_rag::GeminiClient;

// =============================================================================
// Test doubles
// =============================================================================

struct FakeArticles {
    articles: Vec<Article>,
    calls: AtomicUsize,
}

impl FakeArticles {
    fn with(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ArticleSource for FakeArticles {
    async fn fetch_published_articles(&self) -> Result<ArticleLookup> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ArticleLookup::Found(self.articles.clone()))
    }
}

#[derive(Default)]
struct FakeLlm {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(WisnowError::BackendUnavailable(
                "Gemini error 500: upstream exploded at 10.0.0.7".to_string(),
            ));
        }
        Ok("Wisnow adalah basis pengetahuan internal.".to_string())
    }
}

impl FakeLlm {
    fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

fn app_with(articles: Arc<dyn ArticleSource>, llm: Arc<dyn LlmClient>) -> Router {
    create_router(Arc::new(AppState::new(AppConfig::default(), articles, llm)))
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

// =============================================================================
// Root & Health Tests
// =============================================================================

#[tokio::test]
async fn test_root_is_served_without_database() {
    let (status, json) = get(create_router_for_testing(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let (status, json) = get(create_router_for_testing(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_fails_without_database() {
    let (status, json) = get(create_router_for_testing(), "/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);
    assert_eq!(json["checks"]["database"], false);
    assert_eq!(json["checks"]["llm_configured"], false);
}

#[tokio::test]
async fn test_readiness_with_healthy_source() {
    let app = app_with(FakeArticles::with(vec![]), Arc::new(FakeLlm::default()));
    let (status, json) = get(app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (status, json) = get(create_router_for_testing(), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["uptime_seconds"].is_number());
    assert!(json["total_requests"].is_number());
    assert_eq!(json["db_pool"]["initialized"], false);
    assert_eq!(json["db_pool"]["max"], 10);
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, json) = get(create_router_for_testing(), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/chat"].is_object());
}

// =============================================================================
// Chat Tests
// =============================================================================

#[tokio::test]
async fn test_chat_returns_answer() {
    let articles = FakeArticles::with(vec![Article::new("Intro", "Welcome to Wisnow")]);
    let llm = Arc::new(FakeLlm::default());
    let app = app_with(articles.clone(), llm.clone());

    let request = create_json_request(
        "POST",
        "/chat",
        Some(json!({ "question": "Apa itu Wisnow?" })),
    );
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Wisnow adalah basis pengetahuan internal.");
    assert!(json.get("error").is_none());
    assert_eq!(articles.calls.load(Ordering::SeqCst), 1);

    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Intro: Welcome to Wisnow"));
}

#[tokio::test]
async fn test_chat_empty_question() {
    for body in [
        json!({ "question": "" }),
        json!({ "question": "   \n" }),
        json!({ "question": null }),
        json!({}),
    ] {
        let articles = FakeArticles::with(vec![Article::new("Intro", "Welcome to Wisnow")]);
        let llm = Arc::new(FakeLlm::default());
        let app = app_with(articles.clone(), llm.clone());

        let (status, json) = send(app, create_json_request("POST", "/chat", Some(body))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "empty question" }));
        assert_eq!(articles.calls.load(Ordering::SeqCst), 0);
        assert_eq!(llm.call_count(), 0);
    }
}

#[tokio::test]
async fn test_chat_malformed_body() {
    let llm = Arc::new(FakeLlm::default());
    let app = app_with(FakeArticles::with(vec![]), llm.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "invalid request body" }));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_chat_backend_failure_hides_details() {
    let llm = Arc::new(FakeLlm {
        fail: true,
        ..Default::default()
    });
    let app = app_with(FakeArticles::with(vec![]), llm);

    let request = create_json_request("POST", "/chat", Some(json!({ "question": "hi" })));
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json, json!({ "error": "answer service unavailable" }));
    assert!(json.get("answer").is_none());
}

#[tokio::test]
async fn test_chat_backend_timeout_is_service_unavailable() {
    let server = httpmock::MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/models/gemini-test:generateContent");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "terlambat" }] } }]
                }));
        })
        .await;

    let llm = GeminiClient::from_config(&LlmConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.base_url(),
        model: "gemini-test".to_string(),
        timeout_secs: 1,
        ..Default::default()
    })
    .unwrap();
    let app = app_with(FakeArticles::with(vec![]), Arc::new(llm));

    let request = create_json_request("POST", "/chat", Some(json!({ "question": "hi" })));
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json, json!({ "error": "answer service unavailable" }));
}

#[tokio::test]
async fn test_chat_without_database_still_calls_backend() {
    let store = ArticleStore::uninitialized("wisnow.articles");
    let llm = Arc::new(FakeLlm::default());
    let app = app_with(Arc::new(store), llm.clone());

    let (status, _) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);

    let request = create_json_request("POST", "/chat", Some(json!({ "question": "hi" })));
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["answer"].is_string());
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_chat_counts_in_metrics() {
    let state = Arc::new(AppState::new(
        AppConfig::default(),
        FakeArticles::with(vec![]),
        Arc::new(FakeLlm {
            fail: true,
            ..Default::default()
        }),
    ));
    let app = create_router(state.clone());

    let request = create_json_request("POST", "/chat", Some(json!({ "question": "hi" })));
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, json) = get(app, "/metrics").await;
    assert_eq!(json["chat_requests"], 1);
    assert_eq!(json["chat_failures"], 1);
    assert!(json["total_requests"].as_u64().unwrap() >= 1);
}
