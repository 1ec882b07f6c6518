#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::{RagError, Result};

/// Ordered chunk texts, positionally aligned with the vector index: row id
/// `i` in the index maps to `get(i)` here. Persisted as a plain JSON array
/// of strings, no transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStore {
    chunks: Vec<String>,
}

impl ChunkStore {
    #[inline]
    pub fn from_chunks(chunks: Vec<String>) -> Self {
        Self { chunks }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk text for an index row id.
    #[inline]
    pub fn get(&self, id: usize) -> Option<&str> {
        self.chunks.get(id).map(String::as_str)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(String::as_str)
    }

    #[inline]
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(&self.chunks)
            .map_err(|e| RagError::Store(format!("failed to serialize chunk store: {e}")))?;
        fs::write(path, content)?;
        info!("Saved {} chunks to {}", self.len(), path.display());
        Ok(())
    }

    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let chunks: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            RagError::Store(format!("invalid chunk store file {}: {e}", path.display()))
        })?;

        debug!("Loaded {} chunks from {}", chunks.len(), path.display());
        Ok(Self { chunks })
    }
}
