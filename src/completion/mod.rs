#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Client for a hosted Gemini-style text completion endpoint.
///
/// Downstream consumer of retrieval output: takes an assembled prompt and
/// returns generated text. Errors are fatal for the single request, with
/// no automatic retries.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    endpoint: Url,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl CompletionClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.completion.endpoint)
            .map_err(|e| RagError::Config(format!("invalid completion endpoint: {e}")))?;
        let api_key = config.completion.api_key()?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.completion.model.clone(),
            api_key,
            temperature: config.completion.temperature,
            max_output_tokens: config.completion.max_output_tokens,
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

    /// Send the prompt and return the generated text.
    #[inline]
    pub fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion (prompt length: {})", prompt.len());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let path = format!(
            "{}/models/{}:generateContent",
            self.endpoint.as_str().trim_end_matches('/'),
            self.model
        );
        let mut url = Url::parse(&path)
            .map_err(|e| RagError::Service(format!("failed to build request URL: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Service(format!("failed to serialize request: {e}")))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => {
                    RagError::Service(format!("completion request failed: HTTP {code}"))
                }
                other => RagError::Service(format!("completion request failed: {other}")),
            })?;

        let response: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::UnexpectedResponse(format!("invalid completion payload: {e}")))?;

        let text = response
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.swap_remove(0).content
                }
            })
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text);

        text.ok_or_else(|| {
            RagError::UnexpectedResponse(
                "completion response missing 'candidates[0].content.parts[0].text'".to_string(),
            )
        })
    }
}
