// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::config::EmbedderConfig;
use crate::core::types::Vector;
use crate::embedding::models::{self, ModelInfo};
use crate::embedding::{check_vector, Embedder, EmbeddingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    http_client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    info: Option<&'static ModelInfo>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            EmbeddingError::Config(
                "missing API key; set the OPENAI_API_KEY environment variable".to_string(),
            )
        })?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("failed to create HTTP client: {}", e)))?;

        let info = models::lookup(&config.model);
        if info.is_none() {
            warn!(
                "Model '{}' is not in the known model table; passing it through unchecked",
                config.model
            );
        }

        Ok(Self {
            http_client,
            endpoint: format!("{}/embeddings", config.api_base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            info,
        })
    }

    pub fn expected_dimension(&self) -> Option<usize> {
        self.info.map(|info| info.dimension)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        debug!("Requesting embedding for {} chars with {}", text.len(), self.model);
        if let Some(info) = self.info {
            if info.may_exceed_input_limit(text) {
                warn!(
                    "Input of ~{} tokens may exceed the {} token limit of {}",
                    models::estimate_tokens(text),
                    info.max_input_tokens,
                    self.model
                );
            }
        }

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::MalformedResponse("no embedding in response".to_string()))?;

        check_vector(&embedding)?;
        if let Some(expected) = self.expected_dimension() {
            if embedding.len() != expected {
                return Err(EmbeddingError::UnexpectedDimension {
                    model: self.model.clone(),
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embedding)
    }
}
