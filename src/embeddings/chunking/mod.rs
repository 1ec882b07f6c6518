
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::Result;

/// A bounded span of document text, stored and indexed as one retrievable
/// unit. Row ids in the vector index refer back to chunks by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text, trimmed, never empty.
    pub text: String,
    /// Source document identifier (file name during corpus builds).
    pub source: Option<String>,
    /// Zero-based position of this chunk within its document.
    pub position: usize,
}

/// Configuration for word-window chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in words.
    pub chunk_size: usize,
    /// Words shared between consecutive windows. Must stay below
    /// `chunk_size` or the window would never advance.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

/// Lazy iterator over overlapping word windows of a document.
///
/// Windows advance by `chunk_size - overlap` words in document order, so
/// the sequence is deterministic and restartable (the iterator is `Clone`).
/// Whitespace-only windows cannot occur: windows are joins of non-empty
/// word tokens.
#[derive(Debug, Clone)]
pub struct WordWindows<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    step: usize,
    start: usize,
    position: usize,
    source: Option<String>,
}

impl<'a> WordWindows<'a> {
    /// Attach a source document identifier to every produced chunk.
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

impl Iterator for WordWindows<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.start >= self.words.len() {
            return None;
        }

        let end = usize::min(self.start + self.chunk_size, self.words.len());
        let text = self.words[self.start..end].join(" ");
        self.start += self.step;

        let position = self.position;
        self.position += 1;

        Some(Chunk {
            text,
            source: self.source.clone(),
            position,
        })
    }
}

/// Split `text` into overlapping windows of `chunk_size` words, advancing
/// by `chunk_size - overlap` words per step.
///
/// Text shorter than `chunk_size` words yields exactly one chunk holding
/// the whole text; empty or whitespace-only text yields no chunks. Fails
/// when the parameters would produce a window that never advances.
#[inline]
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Result<WordWindows<'_>> {
    if chunk_size == 0 {
        return Err(ConfigError::InvalidChunkSize(chunk_size).into());
    }
    if overlap >= chunk_size {
        return Err(ConfigError::InvalidOverlap(overlap, chunk_size).into());
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    debug!(
        "Chunking {} words into windows of {} (overlap {})",
        words.len(),
        chunk_size,
        overlap
    );

    Ok(WordWindows {
        words,
        chunk_size,
        step: chunk_size - overlap,
        start: 0,
        position: 0,
        source: None,
    })
}

/// Convenience wrapper taking the chunking section of the config.
#[inline]
pub fn chunk_with_config<'a>(text: &'a str, config: &ChunkingConfig) -> Result<WordWindows<'a>> {
    chunk_words(text, config.chunk_size, config.overlap)
}
