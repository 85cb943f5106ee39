use serde::{Deserialize, Serialize};
use socratic_core::Embedder;
use tracing::debug;

use crate::chunker::{chunk_text, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::errors::{IndexError, IndexResult};

/// One chunk of the source document together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Brute-force nearest-neighbor index over the embedded chunks of one
/// document. Queries return passages most-relevant first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
}

/// Cosine similarity of two vectors; zero-magnitude inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

impl VectorIndex {
    /// Chunks the document text and embeds every chunk. This is the single
    /// expensive step per document; callers should prefer
    /// [`crate::cache::load_or_build`].
    pub async fn build(document_text: &str, embedder: &dyn Embedder) -> IndexResult<Self> {
        let texts = chunk_text(document_text, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP);
        if texts.is_empty() {
            return Err(IndexError::DocumentError(
                "document contains no indexable text".to_string(),
            ));
        }

        debug!(chunks = texts.len(), "Embedding document chunks");
        let embeddings = embedder.embed(&texts).await?;

        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexedChunk { text, embedding })
            .collect();

        Ok(Self { chunks })
    }

    /// Returns up to `k` passages most relevant to `query`, best first.
    pub async fn query(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> IndexResult<Vec<String>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                IndexError::Core(socratic_core::CoreError::ResponseError(
                    "embedder returned no vectors".to_string(),
                ))
            })?;

        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(&query_embedding, &chunk.embedding), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk.text.clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
