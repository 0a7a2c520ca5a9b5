// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod filter;
pub mod types;
pub mod vector_ops;

pub use filter::SearchFilter;
pub use types::{DocId, DocumentInput, IngestItem, QueryHit, Record, Vector, DEFAULT_CATEGORY};
