// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Ordered metadata records, positionally aligned with the vector index.

use crate::core::types::Record;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("Record with doc_id {0} already exists")]
    DuplicateDocId(String),

    #[error("Record position {position} out of range (len {len})")]
    OutOfRange { position: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    by_doc_id: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered list, rejecting repeated ids.
    pub fn from_records(records: Vec<Record>) -> Result<Self, RecordError> {
        let mut store = Self::new();
        if !records.is_empty() {
            store.append(records)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Result<&Record, RecordError> {
        self.records.get(position).ok_or(RecordError::OutOfRange {
            position,
            len: self.records.len(),
        })
    }

    pub fn find_by_doc_id(&self, doc_id: &str) -> Option<&Record> {
        self.by_doc_id.get(doc_id).map(|&pos| &self.records[pos])
    }

    pub fn position_of(&self, doc_id: &str) -> Option<usize> {
        self.by_doc_id.get(doc_id).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Check a batch for id collisions without changing the store.
    pub fn validate(&self, records: &[Record]) -> Result<(), RecordError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            let id = record.doc_id.as_str();
            if self.by_doc_id.contains_key(id) || !seen.insert(id) {
                return Err(RecordError::DuplicateDocId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Append records in order. Nothing is appended if any id collides.
    pub fn append(&mut self, records: Vec<Record>) -> Result<(), RecordError> {
        self.validate(&records)?;
        self.records.reserve(records.len());
        for record in records {
            self.by_doc_id
                .insert(record.doc_id.as_str().to_string(), self.records.len());
            self.records.push(record);
        }
        Ok(())
    }

    pub(crate) fn rollback(&mut self, len: usize) {
        for record in self.records.drain(len..) {
            self.by_doc_id.remove(record.doc_id.as_str());
        }
    }
}

impl PartialEq for RecordStore {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
