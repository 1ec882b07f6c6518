#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::config::Config;
use crate::embeddings::{embedder_from_config, Embedder};
use crate::store::{ChunkStore, FlatIndex};
use crate::{RagError, Result};

/// A retrieved chunk paired with its score, in index result order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

/// Serving-side context: the query embedder plus the loaded index and chunk
/// store. Constructed once at process start and passed around explicitly.
/// All state is read-only after construction, so one `Retriever` serves any
/// number of sequential queries.
pub struct Retriever {
    embedder: Box<dyn Embedder>,
    index: FlatIndex,
    chunks: ChunkStore,
}

impl Retriever {
    /// Assemble a retriever from already-loaded parts, checking the pairing
    /// invariants: the chunk store must align 1:1 with index rows, and the
    /// embedder's declared width must match the index dimension.
    #[inline]
    pub fn new(embedder: Box<dyn Embedder>, index: FlatIndex, chunks: ChunkStore) -> Result<Self> {
        if chunks.len() != index.len() {
            return Err(RagError::Store(format!(
                "chunk store has {} entries but index has {} vectors",
                chunks.len(),
                index.len()
            )));
        }

        if embedder.dimension() != index.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }

        Ok(Self {
            embedder,
            index,
            chunks,
        })
    }

    /// Load the artifact pair named by the configuration and construct the
    /// configured embedding backend for queries.
    #[inline]
    pub fn open(config: &Config) -> Result<Self> {
        let index_path = config.index_path();
        let chunks_path = config.chunks_path();

        for path in [&index_path, &chunks_path] {
            if !path.exists() {
                return Err(RagError::IndexNotLoaded(path.display().to_string()));
            }
        }

        let index = FlatIndex::load(&index_path)?;
        let chunks = ChunkStore::load(&chunks_path)?;
        let embedder = embedder_from_config(config)?;

        info!(
            "Opened retriever: {} chunks, {} dimensions",
            chunks.len(),
            index.dimension()
        );

        Self::new(embedder, index, chunks)
    }

    #[inline]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embed the query, search the index, and map row ids back to chunk
    /// texts, preserving the index's result ordering.
    ///
    /// A query embedding whose width disagrees with the index dimension is
    /// a hard failure, surfaced to the caller, never truncated or padded.
    #[inline]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        debug!("Retrieving top {} chunks for query", top_k);

        let query_embedding = self.embedder.embed(query)?;
        let hits = self.index.search(&query_embedding, top_k)?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let text = self.chunks.get(hit.id).ok_or_else(|| {
                RagError::Store(format!("index row {} has no chunk text", hit.id))
            })?;
            results.push(ScoredChunk {
                text: text.to_string(),
                score: hit.score,
            });
        }

        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }
}
