// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: &'static str,
    pub dimension: usize,
    pub max_input_tokens: usize,
}

impl ModelInfo {
    /// Whether `text` is likely over the model's input limit.
    pub fn may_exceed_input_limit(&self, text: &str) -> bool {
        estimate_tokens(text) > self.max_input_tokens
    }
}

const KNOWN_MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "text-embedding-3-small",
        dimension: 1536,
        max_input_tokens: 8191,
    },
    ModelInfo {
        name: "text-embedding-3-large",
        dimension: 3072,
        max_input_tokens: 8191,
    },
    ModelInfo {
        name: "text-embedding-ada-002",
        dimension: 1536,
        max_input_tokens: 8191,
    },
];

/// Rough token count, at about four bytes per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Look up a known embedding model.
///
/// `None` means the name is not in the table; what to do about that is the
/// caller's decision.
pub fn lookup(name: &str) -> Option<&'static ModelInfo> {
    KNOWN_MODELS.iter().find(|m| m.name == name)
}
