// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use std::num::NonZeroUsize;
use std::sync::Arc;
use vector_store::config::{EmbedderBackend, EmbedderConfig};
use vector_store::embedding::{self, lookup_model, CachedEmbedder, Embedder, HashingEmbedder};

#[test]
fn test_lookup_is_explicit_about_unknown_models() {
    let small = lookup_model("text-embedding-3-small").unwrap();
    assert_eq!(small.dimension, 1536);
    assert_eq!(small.max_input_tokens, 8191);

    assert_eq!(lookup_model("text-embedding-3-large").unwrap().dimension, 3072);
    assert!(lookup_model("my-local-model").is_none());
}

#[test]
fn test_hashing_backend_from_config() {
    let config = EmbedderConfig {
        backend: EmbedderBackend::Hashing,
        hash_dimension: 384,
        cache_capacity: 0,
        ..Default::default()
    };
    let embedder = embedding::from_config(&config).unwrap();
    assert_eq!(embedder.model(), "feature-hashing-384");
}

#[test]
fn test_openai_backend_requires_key() {
    let config = EmbedderConfig {
        backend: EmbedderBackend::OpenAi,
        api_key: None,
        ..Default::default()
    };
    assert!(embedding::from_config(&config).is_err());
}

#[tokio::test]
async fn test_cache_returns_identical_vectors() {
    let cached = CachedEmbedder::new(
        Arc::new(HashingEmbedder::new(64)),
        NonZeroUsize::new(8).unwrap(),
    );
    let a = cached.embed("Paris, France").await.unwrap();
    let b = cached.embed("Paris, France").await.unwrap();

    assert_eq!(a, b);
    assert_eq!(cached.metrics().hits, 1);
    assert_eq!(cached.model(), "feature-hashing-64");
}
