// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::Vector;
use crate::core::vector_ops::{squared_l2, top_k_smallest};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot add an empty batch of vectors")]
    EmptyBatch,

    #[error("Index is empty")]
    EmptyIndex,

    #[error("k must be at least 1")]
    InvalidK,

    #[error("Vector data length {len} is not a multiple of dimension {dimension}")]
    RaggedData { len: usize, dimension: usize },
}

/// Exact nearest-neighbour index over fixed-dimension vectors.
///
/// Vectors live in one row-major buffer, addressed by insertion position.
/// Search is an exhaustive scan with squared Euclidean distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Empty index; the first `add` fixes the dimension.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            data: Vec::new(),
        }
    }

    /// Rebuild from a row-major buffer, as read back from disk.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self, IndexError> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(IndexError::RaggedData {
                len: data.len(),
                dimension,
            });
        }
        Ok(Self {
            dimension: Some(dimension),
            data,
        })
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        match self.dimension {
            Some(d) if d > 0 => self.data.len() / d,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let d = self.dimension?;
        self.data.get(position * d..(position + 1) * d)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        let d = self.dimension.unwrap_or(1).max(1);
        self.data.chunks_exact(d)
    }

    /// The whole row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Check a batch against the index without changing it.
    pub fn validate(&self, vectors: &[Vector]) -> Result<(), IndexError> {
        let first = vectors.first().ok_or(IndexError::EmptyBatch)?;
        let expected = self.dimension.unwrap_or(first.len());
        if expected == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        for v in vectors {
            if v.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: v.len(),
                });
            }
        }
        Ok(())
    }

    /// Append vectors in order. Nothing is appended if any vector is rejected.
    pub fn add(&mut self, vectors: &[Vector]) -> Result<(), IndexError> {
        self.validate(vectors)?;
        let d = vectors[0].len();
        self.dimension.get_or_insert(d);
        self.data.reserve(vectors.len() * d);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// The `k` nearest stored vectors as `(position, squared distance)`,
    /// nearest first, ties resolved by earlier position.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        let d = match self.dimension {
            Some(d) if !self.data.is_empty() => d,
            _ => return Err(IndexError::EmptyIndex),
        };
        if query.len() != d {
            return Err(IndexError::DimensionMismatch {
                expected: d,
                actual: query.len(),
            });
        }

        let distances: Vec<f32> = self
            .data
            .chunks_exact(d)
            .map(|stored| squared_l2(query, stored))
            .collect();

        Ok(top_k_smallest(&distances, k))
    }

    /// Return to an earlier `(len, dimension)` state. Used to undo an append
    /// whose enclosing batch failed.
    pub(crate) fn rollback(&mut self, len: usize, dimension: Option<usize>) {
        if let Some(d) = self.dimension {
            self.data.truncate(len * d);
        }
        self.dimension = dimension;
    }
}
