
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::{RagError, Result};

/// Similarity metric of an index. Fixed at build time; an index never mixes
/// metrics between build and query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Inner product over unit-normalized vectors. Higher score is better.
    Cosine,
    /// Squared Euclidean distance. Lower score is better.
    L2,
}

/// One search result: a row id and its score under the index metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: usize,
    pub score: f32,
}

/// Exact nearest-neighbor index over a fixed set of embeddings.
///
/// Vectors are stored row-major in one flat buffer; the row id is the
/// insertion order (0..len). The index is immutable after `build`: there
/// is no insert/delete path, re-indexing replaces the whole artifact.
/// Search is brute force, which is exact and fast enough at corpus scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatIndex {
    metric: Metric,
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from embedding vectors.
    ///
    /// The first vector fixes the index dimension; any later vector with a
    /// different width fails the build. With the cosine metric, rows are
    /// unit-normalized here, exactly once, before storage.
    #[inline]
    pub fn build(metric: Metric, vectors: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(RagError::Config(
                "cannot build an index from zero vectors".to_string(),
            ));
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(RagError::Config(
                "cannot build an index from zero-width vectors".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for vector in vectors {
            if vector.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            let mut row = vector.clone();
            if metric == Metric::Cosine {
                normalize(&mut row);
            }
            data.extend_from_slice(&row);
        }

        info!(
            "Built flat index: {} vectors, {} dimensions",
            vectors.len(),
            dimension
        );

        Ok(Self {
            metric,
            dimension,
            data,
        })
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn row(&self, id: usize) -> &[f32] {
        &self.data[id * self.dimension..(id + 1) * self.dimension]
    }

    /// Return up to `top_k` rows ordered best-first: descending score for
    /// cosine, ascending distance for l2. Ties break by ascending row id.
    /// Asking for more rows than stored returns everything available.
    #[inline]
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let query = match self.metric {
            Metric::Cosine => {
                let mut q = query.to_vec();
                normalize(&mut q);
                q
            }
            Metric::L2 => query.to_vec(),
        };

        let mut hits: Vec<SearchHit> = (0..self.len())
            .map(|id| SearchHit {
                id,
                score: match self.metric {
                    Metric::Cosine => dot(self.row(id), &query),
                    Metric::L2 => squared_distance(self.row(id), &query),
                },
            })
            .collect();

        hits.sort_by(|a, b| match self.metric {
            Metric::Cosine => b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)),
            Metric::L2 => a.score.total_cmp(&b.score).then(a.id.cmp(&b.id)),
        });
        hits.truncate(top_k);

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }

    /// Serialize the index to a JSON artifact.
    #[inline]
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(self)
            .map_err(|e| RagError::Store(format!("failed to serialize index: {e}")))?;
        fs::write(path, content)?;
        info!("Saved index ({} vectors) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load an index artifact, verifying its payload is internally
    /// consistent before any search can run against it.
    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&content)
            .map_err(|e| RagError::Store(format!("invalid index file {}: {e}", path.display())))?;

        if index.dimension == 0 {
            return Err(RagError::Store(format!(
                "invalid index file {}: zero dimension",
                path.display()
            )));
        }
        if index.data.len() % index.dimension != 0 {
            return Err(RagError::Store(format!(
                "invalid index file {}: {} values is not a multiple of dimension {}",
                path.display(),
                index.data.len(),
                index.dimension
            )));
        }

        debug!(
            "Loaded index: {} vectors, {} dimensions",
            index.len(),
            index.dimension
        );
        Ok(index)
    }
}

/// Scale to unit length in place. Zero vectors are left unchanged; they
/// have no direction and score zero against everything under cosine.
fn normalize(vector: &mut [f32]) {
    let norm = dot(vector, vector).sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
