// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::config::{DEFAULT_OVERFETCH_FACTOR, DEFAULT_TOP_K};
use crate::core::filter::SearchFilter;
use crate::core::types::QueryHit;
use crate::embedding::Embedder;
use crate::error::{Result, StoreError};
use crate::store::VectorStore;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub top_k: usize,
    pub filter: SearchFilter,
    /// Drop candidates farther than this squared distance.
    pub max_distance: Option<f32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            filter: SearchFilter::default(),
            max_distance: None,
        }
    }
}

impl QueryOptions {
    pub fn top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }
}

/// Semantic search with post-filtering.
///
/// Fetches `top_k * overfetch_factor` nearest candidates, then filters. A
/// selective filter can therefore return fewer than `top_k` hits even when
/// more matching records exist further away.
pub struct QueryEngine {
    embedder: Arc<dyn Embedder>,
    overfetch_factor: usize,
}

impl QueryEngine {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_overfetch(embedder, DEFAULT_OVERFETCH_FACTOR)
    }

    pub fn with_overfetch(embedder: Arc<dyn Embedder>, overfetch_factor: usize) -> Self {
        Self {
            embedder,
            overfetch_factor: overfetch_factor.max(1),
        }
    }

    pub fn overfetch_factor(&self) -> usize {
        self.overfetch_factor
    }

    pub async fn query(
        &self,
        store: &VectorStore,
        text: &str,
        options: &QueryOptions,
    ) -> Result<Vec<QueryHit>> {
        if store.is_empty() {
            return Err(StoreError::EmptyStore);
        }
        if options.top_k == 0 {
            return Err(StoreError::Usage("top_k must be at least 1".to_string()));
        }

        info!("Query: {}", text);
        let query_vector = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| StoreError::embedding(None, e))?;

        let fetch = options.top_k.saturating_mul(self.overfetch_factor);
        let candidates = store.index().search(&query_vector, fetch)?;
        let fetched = candidates.len();

        let mut hits = Vec::with_capacity(options.top_k);
        for (position, distance) in candidates {
            if options.max_distance.map_or(false, |max| distance > max) {
                // candidates are sorted, nothing further can pass
                break;
            }
            let record = store.get(position)?;
            if !options.filter.matches(record) {
                continue;
            }
            hits.push(QueryHit {
                record: record.clone(),
                distance,
            });
            if hits.len() == options.top_k {
                break;
            }
        }

        debug!(
            "Fetched {} candidates, {} survived filtering (top_k {})",
            fetched,
            hits.len(),
            options.top_k
        );
        Ok(hits)
    }
}
