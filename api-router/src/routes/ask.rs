use std::time::Instant;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    question: Option<String>,
}

/// Answers a question against the current index and reports the wall-clock
/// processing time. The context list is `null` when the model states the
/// provided text holds no relevant information.
///
/// Route: POST /ask
pub async fn ask_question(
    State(state): State<ApiState>,
    Json(input): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = input
        .question
        .as_deref()
        .map(str::trim)
        .filter(|question| !question.is_empty())
        .ok_or_else(|| ApiError::ValidationError("No question provided".to_string()))?
        .to_string();

    let index = {
        let library = state.library.read().await;
        library.index()
    }
    .ok_or_else(|| {
        ApiError::ValidationError("No vectors available. Upload a PDF first.".to_string())
    })?;

    info!(question_chars = question.len(), "Received question");

    let start = Instant::now();
    let result = retrieval_pipeline::answer_question(
        &state.llm_client,
        &state.embedding_provider,
        &index,
        &question,
        &state.config.llm_model,
        state.config.retrieval_top_k,
    )
    .await
    .map_err(ApiError::from)?;
    let response_time = start.elapsed().as_secs_f64();

    Ok(Json(json!({
        "answer": result.answer,
        "response_time": response_time,
        "context": result.context,
    })))
}
