//! Wisnow Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Wisnow:
//! - Knowledge-base article models
//! - Common error types
//! - Shared traits for article sources and LLM backends
//! - Configuration management
//! - Article store (PostgreSQL)

pub mod articles;
pub mod config;

pub use articles::ArticleStore;
pub use config::{
    AppConfig, ConfigError, DatabaseConfig, LlmConfig, LoggingConfig, RagConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Wisnow operations
#[derive(Error, Debug)]
pub enum WisnowError {
    #[error("Database pool is not initialized")]
    PoolUninitialized,

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Generative backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WisnowError>;

// ============================================================================
// Articles
// ============================================================================

/// A published, public knowledge-base article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Render the article the way it is handed to the backend as context
    pub fn context_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.content)
    }
}

/// Outcome of an article lookup
///
/// `Found` with an empty list means nothing matched; `Unavailable` means
/// the lookup itself failed and no context could be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleLookup {
    Found(Vec<Article>),
    Unavailable { reason: String },
}

impl ArticleLookup {
    /// Articles from the lookup, empty when unavailable
    pub fn articles(&self) -> &[Article] {
        match self {
            ArticleLookup::Found(articles) => articles,
            ArticleLookup::Unavailable { .. } => &[],
        }
    }

    /// Context lines (`"{title}: {content}"`) for every article found
    pub fn context_lines(&self) -> Vec<String> {
        self.articles().iter().map(Article::context_line).collect()
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ArticleLookup::Found(_))
    }
}

/// Connection pool occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

// ============================================================================
// Traits
// ============================================================================

/// Source of knowledge-base articles
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch every published, public, non-deleted article
    async fn fetch_published_articles(&self) -> Result<ArticleLookup>;

    /// Whether the source can currently serve queries
    async fn is_healthy(&self) -> bool {
        true
    }

    /// Pool occupancy, `None` when the source has no pool
    fn pool_stats(&self) -> Option<PoolStats> {
        None
    }

    /// Release held resources on shutdown
    async fn close(&self) {}
}

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Whether credentials for the backend are present
    fn is_configured(&self) -> bool {
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
