// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! LRU memoisation of embeddings within one process.

use crate::core::types::Vector;
use crate::embedding::{Embedder, EmbeddingError};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState {
    entries: LruCache<String, Vector>,
    metrics: CacheMetrics,
}

/// Wraps an embedder so repeated texts are embedded once.
///
/// Failures are not cached.
pub struct CachedEmbedder<E> {
    inner: E,
    state: Mutex<CacheState>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                metrics: CacheMetrics::default(),
            }),
        }
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.state
            .lock()
            .map(|s| s.metrics)
            .unwrap_or_default()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn lookup(&self, text: &str) -> Option<Vector> {
        let mut state = self.state.lock().ok()?;
        match state.entries.get(text).cloned() {
            Some(hit) => {
                state.metrics.hits += 1;
                Some(hit)
            }
            None => {
                state.metrics.misses += 1;
                None
            }
        }
    }

    fn remember(&self, text: &str, vector: &Vector) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.put(text.to_string(), vector.clone());
        }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        if let Some(hit) = self.lookup(text) {
            debug!("Embedding cache hit ({} chars)", text.len());
            return Ok(hit);
        }
        let vector = self.inner.embed(text).await?;
        self.remember(text, &vector);
        Ok(vector)
    }
}
