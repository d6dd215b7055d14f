//! Relay to an external OpenAI-compatible completion API.
//!
//! The relay is a stateless pass-through: one prompt in, one text answer
//! out. No retries, no streaming, no caching. Callers are expected to map
//! [`RelayError`] to a user-visible placeholder instead of failing the
//! request.

use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use crate::config::AssistantConfig;

/// Ways a relayed completion call can fail.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure, including timeouts
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream answered 2xx but the body had no completion text
    #[error("upstream response had no completion content")]
    MissingContent,
}

/// Client for the upstream completion endpoint.
///
/// Holds a reqwest client with the configured timeout so every relayed
/// call is bounded.
#[derive(Debug, Clone)]
pub struct CompletionRelay {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl CompletionRelay {
    /// Build a relay from configuration.
    pub fn new(config: &AssistantConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Forward a question as a single-message chat completion and return the
    /// reply text.
    #[instrument(skip_all, err)]
    pub async fn ask(&self, question: &str) -> Result<String, RelayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": question
                }
            ]
        });

        let mut request = self.client.post(&url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(RelayError::MissingContent)
    }
}
