// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text-to-vector collaborators.
//!
//! The store never computes embeddings itself; it is handed an [`Embedder`]
//! at construction and calls it once per ingested item and once per query.

pub mod cache;
pub mod hashing;
pub mod models;
pub mod openai;

pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use models::{lookup as lookup_model, ModelInfo, DEFAULT_MODEL};
pub use openai::OpenAiEmbedder;

use crate::config::{EmbedderBackend, EmbedderConfig};
use crate::core::types::Vector;
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Model {model} returned {actual} dimensions, expected {expected}")]
    UnexpectedDimension {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier sent to the service, as configured.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError>;
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        (**self).embed(text).await
    }
}

/// Build the configured embedder, memoised when a cache capacity is set.
pub fn from_config(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let inner: Arc<dyn Embedder> = match config.backend {
        EmbedderBackend::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        EmbedderBackend::Hashing => {
            if config.hash_dimension == 0 {
                return Err(EmbeddingError::Config(
                    "hashing dimension must be at least 1".to_string(),
                ));
            }
            Arc::new(HashingEmbedder::new(config.hash_dimension))
        }
    };

    info!(
        "Using {} embedder with model '{}' (cache capacity {})",
        config.backend,
        inner.model(),
        config.cache_capacity
    );

    Ok(match NonZeroUsize::new(config.cache_capacity) {
        Some(capacity) => Arc::new(CachedEmbedder::new(inner, capacity)),
        None => inner,
    })
}

/// Reject vectors no index could use.
pub(crate) fn check_vector(vector: &[f32]) -> Result<(), EmbeddingError> {
    if vector.is_empty() {
        return Err(EmbeddingError::MalformedResponse(
            "empty embedding".to_string(),
        ));
    }
    if let Some(pos) = vector.iter().position(|x| !x.is_finite()) {
        return Err(EmbeddingError::MalformedResponse(format!(
            "non-finite value at component {}",
            pos
        )));
    }
    Ok(())
}
