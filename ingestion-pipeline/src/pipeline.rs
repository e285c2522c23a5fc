use std::sync::Arc;

use text_splitter::TextSplitter;
use tracing::{debug, info};

use common::{
    error::AppError,
    storage::{
        document_store::UploadBatch,
        vector_index::{IndexedChunk, VectorIndex},
    },
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};

use crate::pdf_extraction::extract_pdf_pages;

/// Builds a fresh [`VectorIndex`] from an upload batch: extract, chunk,
/// embed. The index is returned to the caller, which decides when (and
/// whether) to publish it.
pub struct IngestionPipeline {
    embedding_provider: Arc<EmbeddingProvider>,
    chunk_min_chars: usize,
    chunk_max_chars: usize,
}

impl IngestionPipeline {
    pub fn new(
        embedding_provider: Arc<EmbeddingProvider>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        if config.chunk_min_chars == 0 || config.chunk_min_chars >= config.chunk_max_chars {
            return Err(AppError::Validation(
                "invalid chunk bounds; ensure 0 < chunk_min_chars < chunk_max_chars".into(),
            ));
        }

        Ok(Self {
            embedding_provider,
            chunk_min_chars: config.chunk_min_chars,
            chunk_max_chars: config.chunk_max_chars,
        })
    }

    /// Re-derives the index from every document currently in the batch
    /// directory, in submission order.
    pub async fn build_index(&self, batch: &UploadBatch) -> Result<VectorIndex, AppError> {
        let mut chunks = Vec::new();

        for file_name in &batch.file_names {
            let pages = extract_pdf_pages(&batch.dir.join(file_name)).await?;
            debug!(file = %file_name, pages = pages.len(), "Extracted PDF text");

            for page in pages {
                for piece in self.split_chunks(&page.text) {
                    chunks.push(IndexedChunk {
                        source: file_name.clone(),
                        page: page.page,
                        text: piece,
                    });
                }
            }
        }

        if chunks.is_empty() {
            return Err(AppError::Processing(
                "No extractable text found in uploaded documents".into(),
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedding_provider.embed_batch(texts).await?;

        let index = VectorIndex::from_entries(chunks, embeddings)?;
        info!(
            files = batch.file_names.len(),
            chunks = index.len(),
            dimension = index.dimension(),
            "Built vector index"
        );

        Ok(index)
    }

    fn split_chunks(&self, text: &str) -> Vec<String> {
        let splitter = TextSplitter::new(self.chunk_min_chars..self.chunk_max_chars);
        splitter.chunks(text).map(str::to_owned).collect()
    }
}
