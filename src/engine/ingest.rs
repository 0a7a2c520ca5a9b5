// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::{DocId, IngestItem, Record, Vector};
use crate::embedding::Embedder;
use crate::error::{Result, StoreError};
use crate::storage::StorePersister;
use crate::store::VectorStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns raw inputs into committed, persisted records.
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    persister: StorePersister,
}

impl IngestionPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, persister: StorePersister) -> Self {
        Self {
            embedder,
            persister,
        }
    }

    pub fn persister(&self) -> &StorePersister {
        &self.persister
    }

    /// Embed, commit and save one batch. Returns the new ids in input order.
    ///
    /// All or nothing: if any item fails to embed, the batch does not fit the
    /// store, or the save fails, `store` is left exactly as it was.
    pub async fn ingest(
        &self,
        store: &mut VectorStore,
        items: Vec<IngestItem>,
    ) -> Result<Vec<DocId>> {
        if items.is_empty() {
            return Err(StoreError::Usage("nothing to add".to_string()));
        }

        info!(
            "Adding {} new entries with model {}",
            items.len(),
            self.embedder.model()
        );

        let mut vectors: Vec<Vector> = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let vector = self
                .embedder
                .embed(item.content())
                .await
                .map_err(|e| StoreError::embedding(Some(i), e))?;
            debug!("Embedded item {} ({} dims)", i, vector.len());
            vectors.push(vector);
        }

        let records: Vec<Record> = items
            .into_iter()
            .map(|item| Record::new(DocId::generate(), item.into_document()))
            .collect();
        let ids: Vec<DocId> = records.iter().map(|r| r.doc_id.clone()).collect();

        let checkpoint = store.checkpoint();
        store.commit(vectors, records)?;

        if let Err(e) = self.persister.save(store).await {
            warn!("Save failed, rolling back batch of {}: {}", ids.len(), e);
            store.rollback(checkpoint);
            return Err(e.into());
        }

        Ok(ids)
    }
}
