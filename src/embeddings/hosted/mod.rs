
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::Embedder;
use crate::config::Config;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Embedding client for a hosted Gemini-style API.
///
/// The API key is resolved from the environment at construction time and
/// sent as a query parameter; it never appears in the config file or logs.
#[derive(Debug, Clone)]
pub struct HostedEmbedder {
    endpoint: Url,
    model: String,
    dimension: usize,
    batch_size: u32,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest {
    requests: Vec<BatchEmbedEntry>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedEntry {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    embeddings: Option<Vec<ContentEmbedding>>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl HostedEmbedder {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.embedding.hosted.endpoint)
            .map_err(|e| RagError::Config(format!("invalid hosted endpoint: {e}")))?;
        let api_key = config.embedding.hosted.api_key()?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.embedding.model.clone(),
            dimension: config.embedding.dimension,
            batch_size: config.embedding.hosted.batch_size,
            api_key,
            agent,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    fn request_url(&self, operation: &str) -> Result<Url> {
        let path = format!(
            "{}/models/{}:{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.model,
            operation
        );
        let mut url = Url::parse(&path)
            .map_err(|e| RagError::Service(format!("failed to build request URL: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn post_json(&self, url: &Url, body: &str, action: &str) -> Result<String> {
        self.agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| service_error(action, &e))
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| BatchEmbedEntry {
                    model: format!("models/{}", self.model),
                    content: Content {
                        parts: vec![Part { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let url = self.request_url("batchEmbedContents")?;
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Service(format!("failed to serialize request: {e}")))?;

        let response_text = self.post_json(&url, &request_json, "generate batch embeddings")?;

        let response: BatchEmbedContentsResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                RagError::UnexpectedResponse(format!("invalid batch embedding payload: {e}"))
            })?;

        let embeddings = response.embeddings.ok_or_else(|| {
            RagError::UnexpectedResponse("batch embedding response missing 'embeddings'".to_string())
        })?;

        if embeddings.len() != texts.len() {
            return Err(RagError::UnexpectedResponse(format!(
                "requested {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let mut vectors = Vec::with_capacity(embeddings.len());
        for embedding in embeddings {
            self.check_dimension(&embedding.values)?;
            vectors.push(embedding.values);
        }

        Ok(vectors)
    }
}

impl Embedder for HostedEmbedder {
    #[inline]
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating hosted embedding for text (length: {})", text.len());

        let request = EmbedContentRequest {
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        };

        let url = self.request_url("embedContent")?;
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Service(format!("failed to serialize request: {e}")))?;

        let response_text = self.post_json(&url, &request_json, "generate embedding")?;

        let response: EmbedContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::UnexpectedResponse(format!("invalid embedding payload: {e}")))?;

        let embedding = response.embedding.ok_or_else(|| {
            RagError::UnexpectedResponse("embedding response missing 'embedding'".to_string())
        })?;

        self.check_dimension(&embedding.values)?;
        Ok(embedding.values)
    }

    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating hosted embeddings for {} texts", texts.len());

        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size as usize) {
            results.extend(self.embed_single_batch(batch)?);
        }

        Ok(results)
    }
}

fn service_error(action: &str, err: &ureq::Error) -> RagError {
    match err {
        ureq::Error::StatusCode(code) => {
            RagError::Service(format!("failed to {action}: HTTP {code}"))
        }
        other => RagError::Service(format!("failed to {action}: {other}")),
    }
}
