//! Chat handler
//!
//! Each request is independent: validate, answer, respond.

use crate::error::{ApiError, AppError, EMPTY_QUESTION, INVALID_BODY};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Chat request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// User's question
    #[serde(default)]
    #[schema(example = "Bagaimana cara mengajukan cuti?")]
    pub question: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Generated answer
    #[schema(example = "Cuti diajukan melalui portal HR...")]
    pub answer: String,
}

/// Answer a question from the knowledge base
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer generated", body = ChatResponse),
        (status = 400, description = "Empty question or malformed body", body = ApiError),
        (status = 503, description = "Generative backend unavailable", body = ApiError),
        (status = 500, description = "Internal error", body = ApiError)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    state.record_chat();

    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat body");
        AppError::Validation(INVALID_BODY.to_string())
    })?;

    let question = req.question.as_deref().map(str::trim).unwrap_or_default();
    if question.is_empty() {
        return Err(AppError::Validation(EMPTY_QUESTION.to_string()));
    }
    tracing::debug!(question, "Chat question received");

    match state.answers.answer(question).await {
        Ok(answer) => Ok(Json(ChatResponse { answer })),
        Err(e) => {
            state.record_chat_failure();
            Err(e.into())
        }
    }
}
