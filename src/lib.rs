// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod core;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod records;
pub mod storage;
pub mod store;

pub use error::{Result, StoreError};
pub use store::VectorStore;
