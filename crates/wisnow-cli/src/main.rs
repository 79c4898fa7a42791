//! Wisnow CLI - Command-line interface
//!
//! Usage:
//!   wisnow ask <question>
//!   wisnow articles
//!   wisnow config

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use wisnow_core::{AppConfig, ArticleLookup, ArticleStore};
use wisnow_rag::{AnswerService, GeminiClient};

#[derive(Parser)]
#[command(name = "wisnow")]
#[command(about = "Wisnow knowledge-base chatbot CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(long, global = true, env = "WISNOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the knowledge base a question
    Ask {
        /// Question to ask
        question: String,
    },
    /// List the articles currently served as context
    Articles,
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Ask { question } => {
            let store = Arc::new(ArticleStore::connect(&config.database).await);
            let llm_client = Arc::new(GeminiClient::from_config(&config.llm)?);
            let answers = AnswerService::new(store.clone(), llm_client, config.rag.clone());

            let result = answers.answer(&question).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Failed to answer question");
            }
            store.close().await;

            println!("{}", result?);
        }
        Commands::Articles => {
            let store = ArticleStore::connect(&config.database).await;
            let lookup = store.fetch_published_articles().await;
            store.close().await;

            match lookup? {
                ArticleLookup::Found(articles) if articles.is_empty() => {
                    println!("No published articles.");
                }
                ArticleLookup::Found(articles) => {
                    for article in &articles {
                        println!("{article}");
                    }
                    eprintln!("{} article(s)", articles.len());
                }
                ArticleLookup::Unavailable { reason } => {
                    tracing::warn!(%reason, "Article lookup unavailable");
                    anyhow::bail!("Article lookup failed: {reason}");
                }
            }
        }
        Commands::Config => {
            print!("{}", config.redacted().to_toml()?);
        }
    }

    Ok(())
}
