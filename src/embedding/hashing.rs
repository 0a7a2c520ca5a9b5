// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Offline embedder based on feature hashing.
//!
//! Each lowercase alphanumeric token is hashed with SHA-256 into one of `dim`
//! buckets and counted; the count vector is scaled to unit length. Texts that
//! share words land close together, which is enough for lexical retrieval,
//! demos and deterministic tests without network access.

use crate::core::types::Vector;
use crate::core::vector_ops::l2_normalize;
use crate::embedding::{Embedder, EmbeddingError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

pub const HASHING_MODEL: &str = "feature-hashing";

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "Embedding dimension must be greater than 0");
        Self {
            dimension,
            model: format!("{}-{}", HASHING_MODEL, dimension),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Synchronous form of [`Embedder::embed`].
    pub fn embed_text(&self, text: &str) -> Result<Vector, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;
        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
            tokens += 1;
        }
        if tokens == 0 {
            return Err(EmbeddingError::EmptyInput);
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(prefix) % self.dimension as u64) as usize
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        self.embed_text(text)
    }
}
