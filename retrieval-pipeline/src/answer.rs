use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use serde::Serialize;

use common::{error::AppError, storage::vector_index::ScoredChunk};

/// Phrase the answer model emits when the stuffed context holds nothing
/// relevant. Its presence suppresses the source list in the response.
pub const NO_CONTEXT_MARKER: &str = "The provided text does not contain any information";

/// A source attribution entry in an answer: display filename plus 1-based
/// page number.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceReference {
    pub source: String,
    pub page: u32,
}

/// The outcome of one question: the model's answer and, unless suppressed,
/// the sources of the retrieved context.
#[derive(Debug)]
pub struct QueryAnswer {
    pub answer: String,
    pub context: Option<Vec<SourceReference>>,
}

/// Renders the fixed answering prompt with the retrieved chunks stuffed in.
pub fn create_user_message(chunks: &[ScoredChunk], question: &str) -> String {
    let context = chunks
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r"Answer the questions based on the provided context only.
Please provide the most accurate response based on the question.
<context>
{context}
<context>
Questions:{question}"
    )
}

pub fn create_chat_request(
    user_message: String,
    model: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages([ChatCompletionRequestUserMessage::from(user_message).into()])
        .build()
}

pub fn process_llm_response(
    response: CreateChatCompletionResponse,
) -> Result<String, AppError> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .ok_or(AppError::LLMParsing(
            "No content found in LLM response".into(),
        ))
}

/// Decides the context list for an answer: the retrieved sources, or `None`
/// when nothing was retrieved or the model stated the provided text holds no
/// relevant information.
pub fn resolve_context(answer: &str, chunks: &[ScoredChunk]) -> Option<Vec<SourceReference>> {
    if chunks.is_empty() || answer.contains(NO_CONTEXT_MARKER) {
        None
    } else {
        Some(source_references(chunks))
    }
}

/// Maps retrieved chunks to their attribution entries. Page indices are
/// 0-based in chunk metadata and 1-based here.
pub fn source_references(chunks: &[ScoredChunk]) -> Vec<SourceReference> {
    chunks
        .iter()
        .map(|scored| SourceReference {
            source: scored.chunk.source.clone(),
            page: scored.chunk.page.saturating_add(1),
        })
        .collect()
}
