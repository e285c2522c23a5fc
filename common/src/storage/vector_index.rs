use crate::error::AppError;

/// A retrievable span of extracted document text. `page` is the 0-based page
/// index from extraction; callers translate to 1-based at the API boundary.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub source: String,
    pub page: u32,
    pub text: String,
}

/// A chunk returned by a similarity query, with its cosine score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: IndexedChunk,
    pub score: f32,
}

/// In-memory nearest-neighbor index over embedded chunks, queried with
/// brute-force cosine similarity. One instance exists per upload batch and is
/// replaced wholesale with it.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<(IndexedChunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Builds the index from parallel chunk and embedding vectors. All
    /// embeddings must share one non-zero dimension.
    pub fn from_entries(
        chunks: Vec<IndexedChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, AppError> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Processing(format!(
                "embedding count {} does not match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            return Err(AppError::Processing(
                "cannot build an index without embedded chunks".into(),
            ));
        }

        if embeddings.iter().any(|e| e.len() != dimension) {
            return Err(AppError::Processing(
                "inconsistent embedding dimensions in index input".into(),
            ));
        }

        Ok(Self {
            dimension,
            entries: chunks.into_iter().zip(embeddings).collect(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `take` most similar chunks to the query embedding, best
    /// first.
    pub fn search(&self, query: &[f32], take: usize) -> Vec<ScoredChunk> {
        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query, embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(take);
        results
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
