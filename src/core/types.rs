// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense embedding vector. Every vector in one store has the same length.
pub type Vector = Vec<f32>;

/// Category assigned to bare-text items that arrive without metadata.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

const DERIVED_TITLE_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Fresh random identifier (UUID v4, hyphenated).
    pub fn generate() -> Self {
        DocId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId(s)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        DocId(s.to_string())
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for DocId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Metadata row aligned with one vector in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub doc_id: DocId,
    pub title: String,
    pub category: String,
    pub content: String,
}

impl Record {
    pub fn new(doc_id: DocId, document: DocumentInput) -> Self {
        Self {
            doc_id,
            title: document.title,
            category: document.category,
            content: document.content,
        }
    }
}

/// A document as supplied by the caller, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub title: String,
    pub category: String,
    pub content: String,
}

impl DocumentInput {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            content: content.into(),
        }
    }
}

/// One unit of ingestion input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestItem {
    /// Full document with title and category.
    Document(DocumentInput),
    /// Bare content; title and category are derived.
    Text(String),
}

impl IngestItem {
    pub fn content(&self) -> &str {
        match self {
            IngestItem::Document(doc) => &doc.content,
            IngestItem::Text(text) => text,
        }
    }

    /// Resolve into a full document, deriving the missing fields for bare text.
    pub fn into_document(self) -> DocumentInput {
        match self {
            IngestItem::Document(doc) => doc,
            IngestItem::Text(text) => DocumentInput {
                title: derive_title(&text),
                category: DEFAULT_CATEGORY.to_string(),
                content: text,
            },
        }
    }
}

impl From<DocumentInput> for IngestItem {
    fn from(doc: DocumentInput) -> Self {
        IngestItem::Document(doc)
    }
}

impl From<&str> for IngestItem {
    fn from(text: &str) -> Self {
        IngestItem::Text(text.to_string())
    }
}

fn derive_title(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let mut title: String = first_line.chars().take(DERIVED_TITLE_CHARS).collect();
    if first_line.chars().count() > DERIVED_TITLE_CHARS {
        title.push_str("...");
    }
    title
}

/// A query result: the matched record and its squared L2 distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub record: Record,
    pub distance: f32,
}
