// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::records::RecordError;
use crate::storage::PersistenceError;
use thiserror::Error;

/// Process exit codes reported by the command-line front end.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CORRUPT: i32 = 3;
    pub const EMBEDDING_FAILED: i32 = 4;
    pub const EMPTY_STORE: i32 = 5;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate doc_id: {0}")]
    DuplicateDocId(String),

    #[error("{}", embedding_failed_message(.item, .source))]
    EmbeddingFailed {
        item: Option<usize>,
        #[source]
        source: EmbeddingError,
    },

    #[error("Store is corrupt: {0}")]
    Corrupt(String),

    #[error("No persisted store found")]
    NotFound,

    #[error("Store is empty")]
    EmptyStore,

    #[error("Index is empty")]
    EmptyIndex,

    #[error("Record position {position} out of range (len {len})")]
    OutOfRange { position: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

fn embedding_failed_message(item: &Option<usize>, source: &EmbeddingError) -> String {
    match item {
        Some(i) => format!("Embedding failed for item {}: {}", i, source),
        None => format!("Embedding failed: {}", source),
    }
}

impl StoreError {
    pub fn embedding(item: Option<usize>, source: EmbeddingError) -> Self {
        StoreError::EmbeddingFailed { item, source }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::Usage(_) => exit_code::USAGE,
            StoreError::Corrupt(_) => exit_code::CORRUPT,
            StoreError::EmbeddingFailed { .. } => exit_code::EMBEDDING_FAILED,
            StoreError::EmptyStore | StoreError::EmptyIndex => exit_code::EMPTY_STORE,
            _ => exit_code::FAILURE,
        }
    }
}

impl From<IndexError> for StoreError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::DimensionMismatch { expected, actual } => {
                StoreError::DimensionMismatch { expected, actual }
            }
            IndexError::EmptyBatch => StoreError::Usage("empty batch".to_string()),
            IndexError::EmptyIndex => StoreError::EmptyIndex,
            IndexError::InvalidK => StoreError::Usage(e.to_string()),
            IndexError::RaggedData { .. } => StoreError::Corrupt(e.to_string()),
        }
    }
}

impl From<RecordError> for StoreError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::DuplicateDocId(id) => StoreError::DuplicateDocId(id),
            RecordError::OutOfRange { position, len } => StoreError::OutOfRange { position, len },
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(e: PersistenceError) -> Self {
        match e {
            PersistenceError::NotFound(_) => StoreError::NotFound,
            PersistenceError::Corrupt(reason) => StoreError::Corrupt(reason),
            PersistenceError::Io(err) => StoreError::Io(err),
            PersistenceError::Serialization(msg) => StoreError::Persistence(msg),
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
