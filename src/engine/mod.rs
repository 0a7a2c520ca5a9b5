// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod ingest;
pub mod query;
pub mod sources;

pub use ingest::IngestionPipeline;
pub use query::{QueryEngine, QueryOptions};
