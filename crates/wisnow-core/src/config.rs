//! Wisnow Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Generative backend configuration
    pub llm: LlmConfig,

    /// Context building configuration
    pub rag: RagConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Load from an optional file, then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields with any environment variables that are set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env("API_PORT")? {
            self.server.port = port;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // PostgreSQL
        if let Ok(host) = std::env::var("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = parse_env("DB_PORT")? {
            self.database.port = port;
        }
        if let Ok(name) = std::env::var("DB_DATABASE") {
            self.database.name = name;
        }
        if let Ok(user) = std::env::var("DB_USERNAME") {
            self.database.user = user;
        }
        if let Ok(password) = std::env::var("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(min) = parse_env("DB_POOL_MIN")? {
            self.database.pool_min = min;
        }
        if let Some(max) = parse_env("DB_POOL_MAX")? {
            self.database.pool_max = max;
        }
        if let Some(secs) = parse_env("DB_ACQUIRE_TIMEOUT_SECS")? {
            self.database.acquire_timeout_secs = secs;
        }
        if let Ok(table) = std::env::var("ARTICLES_TABLE") {
            self.database.articles_table = table;
        }

        // Gemini
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.llm.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.llm.model = model;
        }
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(secs) = parse_env("LLM_TIMEOUT_SECS")? {
            self.llm.timeout_secs = secs;
        }
        if let Some(temperature) = parse_env("LLM_TEMPERATURE")? {
            self.llm.temperature = temperature;
        }
        if let Some(max_tokens) = parse_env("LLM_MAX_TOKENS")? {
            self.llm.max_tokens = max_tokens;
        }

        // Context
        if let Some(chars) = parse_env("MAX_CONTEXT_CHARS")? {
            self.rag.max_context_chars = chars;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        if db.pool_max == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_POOL_MAX".to_string(),
                value: db.pool_max.to_string(),
            });
        }
        if db.acquire_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_ACQUIRE_TIMEOUT_SECS".to_string(),
                value: db.acquire_timeout_secs.to_string(),
            });
        }
        if db.pool_min > db.pool_max {
            return Err(ConfigError::InvalidValue {
                key: "DB_POOL_MIN".to_string(),
                value: format!("{} (greater than DB_POOL_MAX {})", db.pool_min, db.pool_max),
            });
        }
        if !is_valid_table_name(&db.articles_table) {
            return Err(ConfigError::InvalidValue {
                key: "ARTICLES_TABLE".to_string(),
                value: db.articles_table.clone(),
            });
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TIMEOUT_SECS".to_string(),
                value: self.llm.timeout_secs.to_string(),
            });
        }
        Ok(())
    }

    /// Copy of the configuration with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.database.password = REDACTED.to_string();
        if config.llm.api_key.is_some() {
            config.llm.api_key = Some(REDACTED.to_string());
        }
        config
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

const REDACTED: &str = "********";

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// A table name is one or two plain identifiers joined by a dot
fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS (empty allows any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            cors_origins: vec![],
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,

    /// Connections kept open at all times
    pub pool_min: u32,

    /// Upper bound on open connections
    pub pool_max: u32,

    /// How long a caller waits for a free connection
    pub acquire_timeout_secs: u64,

    /// Schema-qualified articles table
    pub articles_table: String,
}

impl DatabaseConfig {
    /// PostgreSQL connect options
    ///
    /// Each field is passed separately, so credentials are never parsed
    /// as part of a URL.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "dashboard".to_string(),
            user: "postgres".to_string(),
            password: "root".to_string(),
            pool_min: 1,
            pool_max: 10,
            acquire_timeout_secs: 30,
            articles_table: "wisnow.articles".to_string(),
        }
    }
}

/// Generative backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini API key
    pub api_key: Option<String>,

    /// Gemini API base URL
    pub base_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// Context building configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum context length (characters)
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 8000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
