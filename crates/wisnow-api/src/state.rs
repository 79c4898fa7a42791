//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use wisnow_core::config::AppConfig;
use wisnow_core::{ArticleSource, ArticleStore, LlmClient, Result};
use wisnow_rag::{AnswerService, GeminiClient};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Total request latency in microseconds
    pub total_latency_us: AtomicU64,
    /// Chat requests received
    pub chat_count: AtomicU64,
    /// Chat requests that ended in an error
    pub chat_failures: AtomicU64,
    /// Article source behind the answer service
    pub articles: Arc<dyn ArticleSource>,
    /// LLM client
    pub llm_client: Arc<dyn LlmClient>,
    /// Answer service
    pub answers: AnswerService,
}

impl AppState {
    /// Create new application state from its collaborators
    pub fn new(
        config: AppConfig,
        articles: Arc<dyn ArticleSource>,
        llm_client: Arc<dyn LlmClient>,
    ) -> Self {
        let answers = AnswerService::new(articles.clone(), llm_client.clone(), config.rag.clone());

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            chat_count: AtomicU64::new(0),
            chat_failures: AtomicU64::new(0),
            articles,
            llm_client,
            answers,
        }
    }

    /// Connect the article store and build the Gemini client
    ///
    /// A database that cannot be reached leaves the store uninitialized;
    /// the server still starts.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        let store = ArticleStore::connect(&config.database).await;
        let llm_client = GeminiClient::from_config(&config.llm)?;

        if !llm_client.is_configured() {
            tracing::warn!("GEMINI_API_KEY is not set; chat requests will fail");
        }

        Ok(Self::new(config, Arc::new(store), Arc::new(llm_client)))
    }

    /// Release the database pool
    pub async fn shutdown(&self) {
        self.articles.close().await;
    }

    /// Record a finished request
    pub fn record_request(&self, latency_us: u64) -> u64 {
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Average latency in milliseconds
    pub fn average_latency_ms(&self) -> f64 {
        let count = self.get_request_count();
        if count == 0 {
            return 0.0;
        }
        self.total_latency_us.load(Ordering::Relaxed) as f64 / count as f64 / 1000.0
    }

    pub fn record_chat(&self) {
        self.chat_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_chat_failure(&self) {
        self.chat_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
