use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

use super::error::EnrichmentError;
use super::traits::{AiProvider, CompletionRequest};

/// Ollama-compatible HTTP client for report enrichment.
pub struct HttpAiProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpAiProvider {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, EnrichmentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, EnrichmentError> {
        Self::new(
            &config.provider_base_url,
            &config.provider_model,
            config.provider_timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> EnrichmentError {
        if e.is_connect() {
            EnrichmentError::ProviderConnection(self.base_url.clone())
        } else if e.is_timeout() {
            EnrichmentError::Timeout(Duration::from_secs(self.timeout_secs))
        } else {
            EnrichmentError::HttpClient(e.to_string())
        }
    }
}

/// Request body for /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response body from /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Map a non-2xx status into a module failure.
fn status_error(status: u16, body: String) -> EnrichmentError {
    const MAX_BODY: usize = 500;
    let body = if body.len() > MAX_BODY {
        let cut = (0..=MAX_BODY).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body
    };
    EnrichmentError::ProviderStatus { status, body }
}

#[async_trait]
impl AiProvider for HttpAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnrichmentError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: &request.system,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::MalformedResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}
