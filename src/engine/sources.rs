// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Readers that turn command-line input into ingestion items.

use crate::core::types::{DocumentInput, IngestItem};
use crate::error::{Result, StoreError};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// One full document. All three fields are required together.
pub fn single_document(
    title: Option<String>,
    category: Option<String>,
    content: Option<String>,
) -> Result<IngestItem> {
    match (title, category, content) {
        (Some(title), Some(category), Some(content)) => {
            Ok(IngestItem::Document(DocumentInput::new(title, category, content)))
        }
        (title, category, content) => {
            let missing: Vec<&str> = [
                ("title", title.is_none()),
                ("category", category.is_none()),
                ("content", content.is_none()),
            ]
            .iter()
            .filter(|(_, is_missing)| *is_missing)
            .map(|(name, _)| *name)
            .collect();
            Err(StoreError::Usage(format!(
                "adding a record needs title, category and content together; missing {}",
                missing.join(", ")
            )))
        }
    }
}

pub fn text_item(text: impl Into<String>) -> Result<IngestItem> {
    let text = text.into();
    if text.trim().is_empty() {
        return Err(StoreError::Usage("text to add is empty".to_string()));
    }
    Ok(IngestItem::Text(text))
}

/// One bare-text item per non-blank line, trimmed.
pub async fn read_lines(path: impl AsRef<Path>) -> Result<Vec<IngestItem>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).await?;
    parse_lines(&contents).map_err(|e| with_path(e, path))
}

/// A JSON array of `{title, category, content}` objects.
pub async fn read_json_batch(path: impl AsRef<Path>) -> Result<Vec<IngestItem>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).await?;
    parse_json_batch(&contents).map_err(|e| with_path(e, path))
}

pub fn parse_lines(contents: &str) -> Result<Vec<IngestItem>> {
    let items: Vec<IngestItem> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| IngestItem::Text(line.to_string()))
        .collect();
    if items.is_empty() {
        return Err(StoreError::Usage("no non-blank lines to add".to_string()));
    }
    Ok(items)
}

pub fn parse_json_batch(contents: &str) -> Result<Vec<IngestItem>> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| StoreError::Usage(format!("batch is not valid JSON: {}", e)))?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(StoreError::Usage(format!(
                "batch must be a JSON array of objects, found {}",
                json_type_name(&other)
            )))
        }
    };
    if entries.is_empty() {
        return Err(StoreError::Usage("batch contains no entries".to_string()));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value::<DocumentInput>(entry)
                .map(IngestItem::Document)
                .map_err(|e| StoreError::Usage(format!("batch entry {}: {}", i, e)))
        })
        .collect()
}

fn with_path(err: StoreError, path: &Path) -> StoreError {
    match err {
        StoreError::Usage(msg) => StoreError::Usage(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
