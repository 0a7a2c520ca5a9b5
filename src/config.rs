// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::embedding::DEFAULT_MODEL;
use crate::storage::{StoreLocation, DEFAULT_INDEX_FILE, DEFAULT_RECORDS_FILE};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OVERFETCH_FACTOR: usize = 2;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub index_file: String,
    pub records_file: String,
    /// Candidates fetched per requested result before filtering.
    pub overfetch_factor: usize,
    pub default_top_k: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            records_file: DEFAULT_RECORDS_FILE.to_string(),
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("VECTOR_STORE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            index_file: env::var("VECTOR_STORE_INDEX_FILE").unwrap_or(defaults.index_file),
            records_file: env::var("VECTOR_STORE_RECORDS_FILE").unwrap_or(defaults.records_file),
            overfetch_factor: env::var("VECTOR_STORE_OVERFETCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&f: &usize| f >= 1)
                .unwrap_or(defaults.overfetch_factor),
            default_top_k: env::var("VECTOR_STORE_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&k: &usize| k >= 1)
                .unwrap_or(defaults.default_top_k),
        }
    }

    pub fn location(&self) -> StoreLocation {
        StoreLocation::with_file_names(&self.data_dir, &self.index_file, &self.records_file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderBackend {
    /// OpenAI-compatible HTTP embeddings endpoint.
    OpenAi,
    /// Offline feature-hashing embedder.
    Hashing,
}

impl FromStr for EmbedderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(EmbedderBackend::OpenAi),
            "hashing" | "offline" => Ok(EmbedderBackend::Hashing),
            other => Err(format!(
                "unknown embedder backend '{}' (expected openai or hashing)",
                other
            )),
        }
    }
}

impl fmt::Display for EmbedderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderBackend::OpenAi => f.write_str("openai"),
            EmbedderBackend::Hashing => f.write_str("hashing"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct EmbedderConfig {
    pub backend: EmbedderBackend,
    /// Passed to the service as-is; unknown names are not rejected locally.
    pub model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Memoised embeddings kept per process; 0 disables the cache.
    pub cache_capacity: usize,
    /// Output dimension of the hashing backend.
    pub hash_dimension: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::OpenAi,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            cache_capacity: 1024,
            hash_dimension: 1536,
        }
    }
}

impl EmbedderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("VECTOR_STORE_EMBEDDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backend),
            model: env::var("VECTOR_STORE_MODEL").unwrap_or(defaults.model),
            api_base: env::var("OPENAI_BASE_URL").unwrap_or(defaults.api_base),
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout: env::var("VECTOR_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            cache_capacity: env::var("VECTOR_STORE_CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            hash_dimension: env::var("VECTOR_STORE_HASH_DIM")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&d: &usize| d >= 1)
                .unwrap_or(defaults.hash_dimension),
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderConfig")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("cache_capacity", &self.cache_capacity)
            .field("hash_dimension", &self.hash_dimension)
            .finish()
    }
}
