//! Wisnow RAG - Retrieval-Augmented Generation
//!
//! This crate answers questions from the knowledge base:
//! - Published articles are fetched from an [`ArticleSource`]
//! - Their text is packed into a context bounded by a character budget
//! - A single prompt is sent to the generative backend
//!
//! A failed article lookup does not fail the answer; the backend is
//! still asked, without context.

use std::sync::Arc;
use std::time::Instant;
use wisnow_core::{ArticleLookup, ArticleSource, LlmClient, RagConfig, Result, WisnowError};

pub mod llm;

pub use llm::GeminiClient;

// ============================================================================
// Answer Service
// ============================================================================

/// Answers questions from knowledge-base articles
pub struct AnswerService {
    /// Article source
    articles: Arc<dyn ArticleSource>,

    /// LLM client
    llm_client: Arc<dyn LlmClient>,

    /// Configuration
    config: RagConfig,
}

impl AnswerService {
    /// Create a new answer service
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        llm_client: Arc<dyn LlmClient>,
        config: RagConfig,
    ) -> Self {
        Self {
            articles,
            llm_client,
            config,
        }
    }

    /// Answer a question
    ///
    /// Returns [`WisnowError::Validation`] for a blank question without
    /// touching the article source or the backend, and
    /// [`WisnowError::BackendUnavailable`] when generation fails.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(WisnowError::Validation("empty question".to_string()));
        }

        let start_time = Instant::now();
        tracing::info!(question_len = question.len(), "Answering question");

        let lookup = self.retrieve().await;
        let context = build_context(&lookup.context_lines(), self.config.max_context_chars);
        tracing::debug!(
            articles = lookup.articles().len(),
            context_chars = context.chars().count(),
            "Context built"
        );

        let prompt = build_prompt(question, &context);
        tracing::info!("Calling LLM with prompt length: {} chars", prompt.len());

        let answer = self.llm_client.generate(&prompt).await.map_err(|e| {
            tracing::error!(error = %e, "Generative backend call failed");
            match e {
                WisnowError::BackendUnavailable(_) => e,
                other => WisnowError::BackendUnavailable(other.to_string()),
            }
        })?;

        tracing::info!(
            answer_len = answer.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "LLM response received"
        );

        Ok(answer)
    }

    /// Fetch articles, collapsing every failure into `Unavailable`
    async fn retrieve(&self) -> ArticleLookup {
        match self.articles.fetch_published_articles().await {
            Ok(ArticleLookup::Unavailable { reason }) => {
                tracing::warn!(%reason, "Article lookup failed, answering without context");
                ArticleLookup::Unavailable { reason }
            }
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::warn!(error = %e, "Article store unavailable, answering without context");
                ArticleLookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// ============================================================================
// Context & Prompt
// ============================================================================

/// Join context lines with newlines, stopping at `max_chars` characters
///
/// The line that crosses the budget is cut at a character boundary and
/// everything after it is dropped.
pub fn build_context(lines: &[String], max_chars: usize) -> String {
    let mut context = String::new();
    let mut remaining = max_chars;

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            if remaining == 0 {
                break;
            }
            context.push('\n');
            remaining -= 1;
        }

        let len = line.chars().count();
        if len <= remaining {
            context.push_str(line);
            remaining -= len;
        } else {
            context.extend(line.chars().take(remaining));
            break;
        }
    }

    context
}

const SYSTEM_INSTRUCTION: &str = "Kamu adalah asisten basis pengetahuan Wisnow.\n\
     Jawab pertanyaan hanya berdasarkan artikel pada konteks.\n\
     Jika jawabannya tidak ada di konteks, katakan bahwa informasinya tidak ditemukan.";

const NO_CONTEXT: &str = "(Tidak ada artikel yang tersedia.)";

fn build_prompt(question: &str, context: &str) -> String {
    let context = if context.is_empty() { NO_CONTEXT } else { context };

    PromptBuilder::new()
        .system(SYSTEM_INSTRUCTION)
        .add_context(context)
        .question(question)
        .add_instruction("Jawab dalam bahasa yang sama dengan pertanyaan")
        .add_instruction("Sebutkan judul artikel yang kamu gunakan")
        .build()
}

/// Builder for constructing prompts
pub struct PromptBuilder {
    system_instruction: String,
    context_sections: Vec<String>,
    question: String,
    instructions: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self {
            system_instruction: String::new(),
            context_sections: Vec::new(),
            question: String::new(),
            instructions: Vec::new(),
        }
    }

    /// Set system instruction
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Add a context section
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context_sections.push(context.into());
        self
    }

    /// Set the question
    pub fn question(mut self, q: impl Into<String>) -> Self {
        self.question = q.into();
        self
    }

    /// Add an instruction
    pub fn add_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Build the final prompt
    pub fn build(self) -> String {
        let mut prompt = String::new();

        if !self.system_instruction.is_empty() {
            prompt.push_str(&self.system_instruction);
            prompt.push_str("\n\n");
        }

        if !self.context_sections.is_empty() {
            prompt.push_str("Konteks:\n");
            for section in &self.context_sections {
                prompt.push_str(section);
                prompt.push('\n');
            }
            prompt.push('\n');
        }

        if !self.question.is_empty() {
            prompt.push_str("Pertanyaan:\n");
            prompt.push_str(&self.question);
            prompt.push_str("\n\n");
        }

        if !self.instructions.is_empty() {
            prompt.push_str("Petunjuk:\n");
            for (i, inst) in self.instructions.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, inst));
            }
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
