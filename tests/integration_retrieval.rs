#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end pipeline tests: build a corpus against a mocked Ollama
// server, persist the artifacts, reopen them, and retrieve.

use ragdex::RagError;
use ragdex::config::Config;
use ragdex::indexer::build_corpus;
use ragdex::retriever::Retriever;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const DIMENSION: usize = 4;

/// Deterministic stand-in for an embedding model: byte sums bucketed by
/// position. Identical text always maps to the identical vector.
fn fake_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dimension];
    for (i, b) in text.bytes().enumerate() {
        v[i % dimension] += f32::from(b);
    }
    v
}

/// Responds to both single (`prompt`) and batch (`input`) embed requests
/// with vectors computed from the request text.
struct FakeModel {
    dimension: usize,
}

impl Respond for FakeModel {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };

        if let Some(text) = body.get("prompt").and_then(|p| p.as_str()) {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"embedding": fake_vector(text, self.dimension)}));
        }

        if let Some(inputs) = body.get("input").and_then(|i| i.as_array()) {
            let embeddings: Vec<Vec<f32>> = inputs
                .iter()
                .filter_map(|t| t.as_str())
                .map(|t| fake_vector(t, self.dimension))
                .collect();
            return ResponseTemplate::new(200).set_body_json(json!({"embeddings": embeddings}));
        }

        ResponseTemplate::new(400)
    }
}

fn test_config(server: &MockServer, base_dir: &Path, dimension: usize) -> Config {
    let mut config = Config::with_base_dir(base_dir);
    config.embedding.model = "test-model".to_string();
    config.embedding.dimension = dimension;
    config.embedding.ollama.host = server.address().ip().to_string();
    config.embedding.ollama.port = server.address().port();
    config.chunking.chunk_size = 6;
    config.chunking.overlap = 2;
    config
}

async fn mount_fake_model(server: &MockServer, dimension: usize) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(FakeModel { dimension })
        .mount(server)
        .await;
}

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("animals.txt"),
        "the quick brown fox jumps over the lazy dog near the river bank",
    )
    .expect("write doc");
    fs::write(
        dir.join("databases.txt"),
        "relational databases store rows in tables indexed by btrees for fast lookup",
    )
    .expect("write doc");
}

#[tokio::test(flavor = "multi_thread")]
async fn build_then_retrieve_round_trip() {
    let server = MockServer::start().await;
    mount_fake_model(&server, DIMENSION).await;

    let base = TempDir::new().expect("temp dir");
    let docs = TempDir::new().expect("temp dir");
    write_corpus(docs.path());

    let config = test_config(&server, base.path(), DIMENSION);
    let stats = build_corpus(&config, docs.path()).expect("build succeeds");

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.dimension, DIMENSION);
    assert!(config.index_path().exists());
    assert!(config.chunks_path().exists());

    let retriever = Retriever::open(&config).expect("retriever opens");
    assert_eq!(retriever.chunk_count(), stats.chunks);

    // Querying with the exact text of a stored chunk embeds identically,
    // so that chunk must come back first with cosine score ~1.
    let query = "the quick brown fox jumps over";
    let results = retriever.retrieve(query, 3).expect("retrieve succeeds");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].text, query);
    assert!((results[0].score - 1.0).abs() < 1e-5);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn reopened_retriever_returns_identical_results() {
    let server = MockServer::start().await;
    mount_fake_model(&server, DIMENSION).await;

    let base = TempDir::new().expect("temp dir");
    let docs = TempDir::new().expect("temp dir");
    write_corpus(docs.path());

    let config = test_config(&server, base.path(), DIMENSION);
    build_corpus(&config, docs.path()).expect("build succeeds");

    let first = Retriever::open(&config)
        .expect("retriever opens")
        .retrieve("rows in tables", 4)
        .expect("retrieve succeeds");
    let second = Retriever::open(&config)
        .expect("retriever opens")
        .retrieve("rows in tables", 4)
        .expect("retrieve succeeds");

    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn mismatched_model_width_aborts_build_without_artifacts() {
    let server = MockServer::start().await;
    // The model answers with 3-wide vectors while the config declares 4.
    mount_fake_model(&server, 3).await;

    let base = TempDir::new().expect("temp dir");
    let docs = TempDir::new().expect("temp dir");
    write_corpus(docs.path());

    let config = test_config(&server, base.path(), DIMENSION);
    let result = build_corpus(&config, docs.path());

    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: DIMENSION,
            actual: 3
        })
    ));
    assert!(!config.index_path().exists());
    assert!(!config.chunks_path().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_is_a_service_error() {
    let server = MockServer::start().await;
    mount_fake_model(&server, DIMENSION).await;

    let base = TempDir::new().expect("temp dir");
    let docs = TempDir::new().expect("temp dir");
    write_corpus(docs.path());

    let config = test_config(&server, base.path(), DIMENSION);
    build_corpus(&config, docs.path()).expect("build succeeds");

    // Reopen against a dead port: retrieval fails with a Service error,
    // as queries embed over the network.
    let mut dead_config = config.clone();
    dead_config.embedding.ollama.port = 1;

    let retriever = Retriever::open(&dead_config).expect("artifacts load fine");
    let result = retriever.retrieve("anything", 2);

    assert!(matches!(result, Err(RagError::Service(_))));
}
