// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod codec;
pub mod persistence;

pub use persistence::{StoreLocation, StorePersister, DEFAULT_INDEX_FILE, DEFAULT_RECORDS_FILE};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("No persisted store in {}", .0.display())]
    NotFound(PathBuf),

    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
