use super::*;
use crate::store::Metric;
use tempfile::TempDir;

/// Deterministic offline embedder for fixture indexes. Declares one width
/// but can be told to emit another, to exercise the dimension guard.
struct FixtureEmbedder {
    declared: usize,
    emitted: usize,
}

impl FixtureEmbedder {
    fn new(dimension: usize) -> Self {
        Self {
            declared: dimension,
            emitted: dimension,
        }
    }

    fn lying(declared: usize, emitted: usize) -> Self {
        Self { declared, emitted }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.emitted];
        for (i, b) in text.bytes().enumerate() {
            v[i % self.emitted] += f32::from(b);
        }
        v
    }
}

impl Embedder for FixtureEmbedder {
    fn dimension(&self) -> usize {
        self.declared
    }

    fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

fn fixture_retriever(texts: &[&str]) -> Retriever {
    let embedder = FixtureEmbedder::new(4);
    let vectors: Vec<Vec<f32>> = texts.iter().map(|t| embedder.vector_for(t)).collect();
    let index = FlatIndex::build(Metric::Cosine, &vectors).expect("build succeeds");
    let chunks = ChunkStore::from_chunks(texts.iter().map(|t| (*t).to_string()).collect());

    Retriever::new(Box::new(embedder), index, chunks).expect("retriever assembles")
}

#[test]
fn retrieve_maps_ids_to_texts_in_result_order() {
    let retriever = fixture_retriever(&[
        "the quick brown fox",
        "a completely different sentence about databases",
        "the quick brown foxes",
    ]);

    let results = retriever
        .retrieve("the quick brown fox", 2)
        .expect("retrieve succeeds");

    assert_eq!(results.len(), 2);
    // Exact text match embeds identically, so it comes back first.
    assert_eq!(results[0].text, "the quick brown fox");
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert!(results[0].score >= results[1].score);
}

#[test]
fn retrieve_caps_at_store_size() {
    let retriever = fixture_retriever(&["one", "two"]);

    let results = retriever.retrieve("one", 50).expect("retrieve succeeds");
    assert_eq!(results.len(), 2);
}

#[test]
fn mismatched_pair_sizes_are_rejected() {
    let embedder = FixtureEmbedder::new(4);
    let vectors = vec![embedder.vector_for("a"), embedder.vector_for("b")];
    let index = FlatIndex::build(Metric::Cosine, &vectors).expect("build succeeds");
    let chunks = ChunkStore::from_chunks(vec!["only one chunk".to_string()]);

    let result = Retriever::new(Box::new(embedder), index, chunks);
    assert!(matches!(result, Err(RagError::Store(_))));
}

#[test]
fn embedder_width_must_match_index() {
    let build_embedder = FixtureEmbedder::new(4);
    let vectors = vec![build_embedder.vector_for("a")];
    let index = FlatIndex::build(Metric::Cosine, &vectors).expect("build succeeds");
    let chunks = ChunkStore::from_chunks(vec!["a".to_string()]);

    // Query-side embedder declares a different width than the index
    let query_embedder = FixtureEmbedder::new(8);
    let result = Retriever::new(Box::new(query_embedder), index, chunks);

    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 4,
            actual: 8
        })
    ));
}

#[test]
fn query_embedding_width_mismatch_is_fatal() {
    // Index built at width 384; the embedder declares 384 but emits 768,
    // as a misconfigured remote model would.
    let build_embedder = FixtureEmbedder::new(384);
    let vectors = vec![
        build_embedder.vector_for("first"),
        build_embedder.vector_for("second"),
    ];
    let index = FlatIndex::build(Metric::Cosine, &vectors).expect("build succeeds");
    let chunks = ChunkStore::from_chunks(vec!["first".to_string(), "second".to_string()]);

    let lying = FixtureEmbedder::lying(384, 768);
    let retriever = Retriever::new(Box::new(lying), index, chunks).expect("retriever assembles");

    let result = retriever.retrieve("anything", 1);
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 384,
            actual: 768
        })
    ));
}

#[test]
fn open_without_artifacts_is_index_not_loaded() {
    let dir = TempDir::new().expect("temp dir");
    let config = crate::config::Config::with_base_dir(dir.path());

    let result = Retriever::open(&config);
    assert!(matches!(result, Err(RagError::IndexNotLoaded(_))));
}
