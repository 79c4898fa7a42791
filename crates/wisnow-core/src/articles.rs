//! PostgreSQL article store
//!
//! Reads published, public knowledge-base articles through a bounded
//! SQLx connection pool. The store never writes.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;

use crate::{Article, ArticleLookup, ArticleSource, DatabaseConfig, PoolStats, Result, WisnowError};

/// PostgreSQL article store
pub struct ArticleStore {
    /// `None` when the pool could not be created at startup
    pool: Option<PgPool>,
    query: String,
}

impl ArticleStore {
    /// Create the pool, falling back to an uninitialized store on failure
    ///
    /// A failed connection is logged rather than returned so the server
    /// can still start; article fetches then fail with
    /// [`WisnowError::PoolUninitialized`].
    pub async fn connect(config: &DatabaseConfig) -> Self {
        let result = Self::pool_options(config)
            .connect_with(config.connect_options())
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(
                    host = %config.host,
                    database = %config.name,
                    min = config.pool_min,
                    max = config.pool_max,
                    "Database pool created"
                );
                Self::from_pool(pool, &config.articles_table)
            }
            Err(e) => {
                tracing::error!(
                    host = %config.host,
                    database = %config.name,
                    error = %e,
                    "Failed to create database pool"
                );
                Self::uninitialized(&config.articles_table)
            }
        }
    }

    /// Pool options derived from config
    pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(config.pool_min)
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool, table: &str) -> Self {
        Self {
            pool: Some(pool),
            query: published_articles_query(table),
        }
    }

    /// Store without a pool
    pub fn uninitialized(table: &str) -> Self {
        Self {
            pool: None,
            query: published_articles_query(table),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    /// Close the pool, waiting for leased connections to come back
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("Database pool closed");
        }
    }

    /// Fetch every published, public, non-deleted article
    ///
    /// Query failures are absorbed into [`ArticleLookup::Unavailable`];
    /// only a missing pool is an error.
    pub async fn fetch_published_articles(&self) -> Result<ArticleLookup> {
        let pool = self.pool.as_ref().ok_or(WisnowError::PoolUninitialized)?;

        match self.query_articles(pool).await {
            Ok(articles) => {
                tracing::debug!(count = articles.len(), "Fetched published articles");
                Ok(ArticleLookup::Found(articles))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch articles");
                Ok(ArticleLookup::Unavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn query_articles(&self, pool: &PgPool) -> Result<Vec<Article>> {
        // The leased connection goes back to the pool when `conn` drops,
        // whichever way this function returns.
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| WisnowError::QueryFailed(format!("Failed to acquire connection: {e}")))?;

        let rows: Vec<ArticleRow> = sqlx::query_as(&self.query)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| WisnowError::QueryFailed(format!("Failed to select articles: {e}")))?;

        Ok(rows.into_iter().filter_map(ArticleRow::into_article).collect())
    }

    async fn ping(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        sqlx::query("SELECT 1").execute(pool).await.is_ok()
    }
}

fn published_articles_query(table: &str) -> String {
    format!(
        r#"
        SELECT title, content
        FROM {table}
        WHERE deleted_at IS NULL AND status = 'published' AND visibility = 'public'
        "#
    )
}

/// Article row from database
#[derive(Debug, FromRow)]
struct ArticleRow {
    title: String,
    content: Option<String>,
}

impl ArticleRow {
    /// Rows without content carry nothing to answer from
    fn into_article(self) -> Option<Article> {
        self.content.map(|content| Article {
            title: self.title,
            content,
        })
    }
}

#[async_trait]
impl ArticleSource for ArticleStore {
    async fn fetch_published_articles(&self) -> Result<ArticleLookup> {
        ArticleStore::fetch_published_articles(self).await
    }

    async fn is_healthy(&self) -> bool {
        self.ping().await
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        self.pool.as_ref().map(|pool| PoolStats {
            size: pool.size(),
            idle: pool.num_idle(),
        })
    }

    async fn close(&self) {
        ArticleStore::close(self).await
    }
}
