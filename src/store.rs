// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! The vector index and record store held together as one unit.

use crate::core::types::{Record, Vector};
use crate::error::{Result, StoreError};
use crate::index::FlatIndex;
use crate::records::RecordStore;

/// Vector index and records, aligned by position.
///
/// Every mutation goes through [`VectorStore::commit`], which keeps
/// `index.len() == records.len()` whether it succeeds or fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorStore {
    index: FlatIndex,
    records: RecordStore,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair an index with its records, refusing mismatched lengths.
    pub fn from_parts(index: FlatIndex, records: RecordStore) -> Result<Self> {
        if index.len() != records.len() {
            return Err(StoreError::Corrupt(format!(
                "index holds {} vectors but {} records",
                index.len(),
                records.len()
            )));
        }
        Ok(Self { index, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.index.dimension()
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn get(&self, position: usize) -> Result<&Record> {
        Ok(self.records.get(position)?)
    }

    pub fn find_by_doc_id(&self, doc_id: &str) -> Option<&Record> {
        self.records.find_by_doc_id(doc_id)
    }

    /// Append a batch of vectors and their records as one transaction.
    pub fn commit(&mut self, vectors: Vec<Vector>, records: Vec<Record>) -> Result<()> {
        if vectors.len() != records.len() {
            return Err(StoreError::Usage(format!(
                "batch has {} vectors but {} records",
                vectors.len(),
                records.len()
            )));
        }

        self.index.validate(&vectors)?;
        self.records.validate(&records)?;

        let checkpoint = self.checkpoint();
        self.index.add(&vectors)?;
        if let Err(e) = self.records.append(records) {
            self.rollback(checkpoint);
            return Err(e.into());
        }
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.len(),
            dimension: self.dimension(),
        }
    }

    /// Undo every commit made since `checkpoint` was taken.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.index.rollback(checkpoint.len, checkpoint.dimension);
        self.records.rollback(checkpoint.len);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    len: usize,
    dimension: Option<usize>,
}
