// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Metadata filtering for search results
//!
//! Filters are exact-match predicates on record fields. Every predicate that is
//! set must hold (conjunction); an empty filter matches everything.

use crate::core::types::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Keep only records whose category equals this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Keep only the record with this doc_id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.doc_id.is_none()
    }

    /// Check if a record satisfies every predicate that is set
    ///
    /// # Examples
    ///
    /// ```
    /// use vector_store::core::{DocId, Record, SearchFilter};
    ///
    /// let record = Record {
    ///     doc_id: DocId::from("d1"),
    ///     title: "Eiffel Tower".to_string(),
    ///     category: "travel".to_string(),
    ///     content: "The Eiffel Tower is located in Paris, France.".to_string(),
    /// };
    ///
    /// assert!(SearchFilter::new().with_category("travel").matches(&record));
    /// assert!(!SearchFilter::new().with_category("technology").matches(&record));
    /// ```
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = &self.category {
            if record.category != *category {
                return false;
            }
        }
        if let Some(doc_id) = &self.doc_id {
            if record.doc_id.as_str() != doc_id {
                return false;
            }
        }
        true
    }
}
