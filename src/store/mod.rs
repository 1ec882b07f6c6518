// Store module
// Persisted retrieval artifacts: the flat vector index and its chunk store

pub mod chunks;
pub mod index;

pub use chunks::ChunkStore;
pub use index::{FlatIndex, Metric, SearchHit};
