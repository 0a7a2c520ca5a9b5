// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use vector_store::config::{EmbedderBackend, EmbedderConfig};
use vector_store::embedding::{Embedder, EmbeddingError, OpenAiEmbedder};

fn config_for(server: &mockito::Server, model: &str) -> EmbedderConfig {
    EmbedderConfig {
        backend: EmbedderBackend::OpenAi,
        model: model.to_string(),
        api_base: server.url(),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(5),
        cache_capacity: 0,
        hash_dimension: 1536,
    }
}

fn embedding_body(dimension: usize) -> String {
    json!({
        "object": "list",
        "data": [{ "object": "embedding", "index": 0, "embedding": vec![0.25f32; dimension] }],
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": 3, "total_tokens": 3 }
    })
    .to_string()
}

#[tokio::test]
async fn test_embed_sends_model_and_input() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::Json(json!({
            "model": "text-embedding-3-small",
            "input": "Paris, France"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(1536))
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    let vector = embedder.embed("Paris, France").await.unwrap();

    assert_eq!(vector.len(), 1536);
    assert_eq!(vector[0], 0.25);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_reported_with_body() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/embeddings")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    let err = embedder.embed("France").await.unwrap_err();

    assert_eq!(
        err,
        EmbeddingError::Status {
            status: 500,
            body: "upstream exploded".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_response() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": "nope"}"#)
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    assert!(matches!(
        embedder.embed("France").await,
        Err(EmbeddingError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_empty_data_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": []}"#)
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    assert!(matches!(
        embedder.embed("France").await,
        Err(EmbeddingError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_known_model_dimension_is_enforced() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(768))
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    assert_eq!(
        embedder.embed("France").await,
        Err(EmbeddingError::UnexpectedDimension {
            model: "text-embedding-3-small".to_string(),
            expected: 1536,
            actual: 768
        })
    );
}

#[tokio::test]
async fn test_unknown_model_is_passed_through() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({ "model": "local-minilm" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(384))
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "local-minilm")).unwrap();
    assert_eq!(embedder.expected_dimension(), None);
    assert_eq!(embedder.embed("France").await.unwrap().len(), 384);
}

#[tokio::test]
async fn test_blank_text_never_reaches_the_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .expect(0)
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config_for(&server, "text-embedding-3-small")).unwrap();
    assert_eq!(embedder.embed("   ").await, Err(EmbeddingError::EmptyInput));
    mock.assert_async().await;
}

#[test]
fn test_missing_api_key_is_a_config_error() {
    let config = EmbedderConfig {
        api_key: None,
        ..Default::default()
    };
    assert!(matches!(
        OpenAiEmbedder::new(&config),
        Err(EmbeddingError::Config(_))
    ));
}
