//! In-memory embedding index over corpus fragments.

pub mod brute_force;

use futures::{StreamExt as _, TryStreamExt as _};

use docent_llm::provider::EmbedFuture;

pub use brute_force::{BruteForceIndex, cosine_similarity};

use crate::document::Chunk;
use crate::error::IndexError;

/// Nearest-neighbour search over vectors addressed by insertion position.
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` `(position, score)` pairs, best first.
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Fragments paired with their embeddings. Immutable once built.
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    vectors: Box<dyn VectorIndex>,
    dimension: Option<usize>,
}

impl std::fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl Default for CorpusIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl CorpusIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            vectors: Box::new(BruteForceIndex::default()),
            dimension: None,
        }
    }

    /// Embed every chunk and build a brute-force index.
    ///
    /// At most `concurrency` embedding requests run at once; vectors stay in chunk order.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Embedding` on the first failed embedding and
    /// `IndexError::DimensionMismatch` when vectors differ in length.
    pub async fn build<E>(chunks: Vec<Chunk>, embed: E, concurrency: usize) -> Result<Self, IndexError>
    where
        E: Fn(&str) -> EmbedFuture,
    {
        tracing::info!(chunks = chunks.len(), concurrency, "building embedding index");

        let requests: Vec<EmbedFuture> = chunks.iter().map(|c| embed(&c.content)).collect();
        let vectors: Vec<Vec<f32>> = futures::stream::iter(requests)
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        let dimension = vectors.first().map(Vec::len);
        if let Some(expected) = dimension
            && let Some((chunk, v)) = chunks
                .iter()
                .zip(&vectors)
                .find(|(_, v)| v.len() != expected)
        {
            return Err(IndexError::DimensionMismatch {
                origin: chunk.metadata.source.clone(),
                expected,
                found: v.len(),
            });
        }

        tracing::info!(entries = vectors.len(), dimension = ?dimension, "embedding index ready");
        Ok(Self::with_index(chunks, BruteForceIndex::new(vectors), dimension))
    }

    /// Assemble an index from precomputed parts. `index` positions must match `chunks`.
    #[must_use]
    pub fn with_index(
        chunks: Vec<Chunk>,
        index: impl VectorIndex + 'static,
        dimension: Option<usize>,
    ) -> Self {
        Self {
            chunks,
            vectors: Box::new(index),
            dimension,
        }
    }

    /// Top `k` fragments by cosine similarity to `vector`, best first.
    #[must_use]
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<ScoredChunk> {
        self.vectors
            .search(vector, k)
            .into_iter()
            .filter_map(|(pos, score)| {
                self.chunks.get(pos).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    score,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
}
