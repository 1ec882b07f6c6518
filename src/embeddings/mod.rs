// Embeddings module
// Chunking plus the two embedding backends (local Ollama, hosted API)

pub mod chunking;
pub mod hosted;
pub mod ollama;

pub use chunking::{chunk_with_config, chunk_words, Chunk, ChunkingConfig, WordWindows};
pub use hosted::HostedEmbedder;
pub use ollama::OllamaEmbedder;

use crate::config::{Config, EmbeddingBackend};
use crate::Result;

/// Maps text to a fixed-width vector.
///
/// Exactly one implementation is active per index; the backend is chosen
/// by configuration, never inferred. Implementations declare their output
/// width up front and verify every vector they return against it, so a
/// misconfigured model surfaces as `DimensionMismatch` instead of silently
/// corrupting retrieval.
pub trait Embedder {
    /// Declared output width, from configuration.
    fn dimension(&self) -> usize;

    /// Embed a single text (used for queries).
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts (used at build time). Returns one vector per input,
    /// in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Construct the embedding backend named by the configuration.
#[inline]
pub fn embedder_from_config(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.embedding.backend {
        EmbeddingBackend::Ollama => Ok(Box::new(OllamaEmbedder::new(config)?)),
        EmbeddingBackend::Hosted => Ok(Box::new(HostedEmbedder::new(config)?)),
    }
}
