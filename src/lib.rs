use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No index loaded: {0} (run `ragdex build <docs-dir>` first)")]
    IndexNotLoaded(String),

    #[error("Embedding service error: {0}")]
    Service(String),

    #[error("Unexpected service response: {0}")]
    UnexpectedResponse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for RagError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        RagError::Config(err.to_string())
    }
}

pub mod commands;
pub mod completion;
pub mod config;
pub mod embeddings;
pub mod indexer;
pub mod prompt;
pub mod retriever;
pub mod store;
