//! Question answering over the in-memory index: similarity retrieval plus
//! LLM answer synthesis with a fixed prompt template.

pub mod answer;

use tracing::debug;

use common::{
    error::AppError,
    storage::vector_index::{ScoredChunk, VectorIndex},
    utils::embedding::EmbeddingProvider,
};

use answer::QueryAnswer;

/// Embeds the question and returns the `take` most similar chunks.
pub async fn retrieve_chunks(
    index: &VectorIndex,
    embedding_provider: &EmbeddingProvider,
    question: &str,
    take: usize,
) -> Result<Vec<ScoredChunk>, AppError> {
    let query_embedding = embedding_provider
        .embed(question)
        .await
        .map_err(AppError::from)?;

    Ok(index.search(&query_embedding, take))
}

/// Runs the full retrieval chain: retrieve supporting chunks, render the
/// prompt, call the answer model, and attach source references. When the
/// model states the context holds no information, the references are
/// suppressed even though retrieval returned chunks.
pub async fn answer_question(
    openai_client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    embedding_provider: &EmbeddingProvider,
    index: &VectorIndex,
    question: &str,
    model: &str,
    take: usize,
) -> Result<QueryAnswer, AppError> {
    let retrieved = retrieve_chunks(index, embedding_provider, question, take).await?;
    debug!(chunks = retrieved.len(), "Retrieved context for question");

    let request = answer::create_chat_request(answer::create_user_message(&retrieved, question), model)?;
    let response = openai_client.chat().create(request).await?;
    let answer_text = answer::process_llm_response(response)?;
    let context = answer::resolve_context(&answer_text, &retrieved);

    Ok(QueryAnswer {
        answer: answer_text,
        context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::vector_index::IndexedChunk;

    fn indexed(source: &str, page: u32, text: &str) -> IndexedChunk {
        IndexedChunk {
            source: source.to_string(),
            page,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_retrieve_ranks_matching_chunk_first() {
        let provider = EmbeddingProvider::new_hashed(64).expect("hashed provider");
        let texts = [
            indexed("a.pdf", 0, "tokio schedules asynchronous tasks cooperatively"),
            indexed("a.pdf", 1, "the recipe calls for flour butter and sugar"),
        ];
        let mut embeddings = Vec::new();
        for chunk in &texts {
            embeddings.push(provider.embed(&chunk.text).await.expect("embed"));
        }
        let index = VectorIndex::from_entries(texts.to_vec(), embeddings).expect("index");

        let results = retrieve_chunks(&index, &provider, "how does tokio schedule tasks", 1)
            .await
            .expect("retrieval");

        assert_eq!(results.len(), 1);
        assert!(results
            .first()
            .expect("top result")
            .chunk
            .text
            .contains("tokio"));
    }

    #[tokio::test]
    async fn test_retrieve_respects_take() {
        let provider = EmbeddingProvider::new_hashed(32).expect("hashed provider");
        let chunks: Vec<IndexedChunk> = (0..6)
            .map(|i| indexed("doc.pdf", i, &format!("chunk number {i} with filler words")))
            .collect();
        let mut embeddings = Vec::new();
        for chunk in &chunks {
            embeddings.push(provider.embed(&chunk.text).await.expect("embed"));
        }
        let index = VectorIndex::from_entries(chunks, embeddings).expect("index");

        let results = retrieve_chunks(&index, &provider, "chunk number", 4)
            .await
            .expect("retrieval");
        assert_eq!(results.len(), 4);
    }
}
