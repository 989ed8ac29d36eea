// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests against real model files
//!
//! Ignored by default. Point EMBEDDING_TEST_MODEL_DIR at a directory holding
//! `model.onnx` and `tokenizer.json` (e.g. an ONNX export of
//! jina-embeddings-v2-base-en) and run with `--ignored`.

use embedding_server::embeddings::{Embedder, OnnxEmbeddingModel, OnnxModelOptions};
use std::path::PathBuf;

const MODEL_ID: &str = "jinaai/jina-embeddings-v2-base-en";

fn load_test_model() -> OnnxEmbeddingModel {
    let dir = PathBuf::from(
        std::env::var("EMBEDDING_TEST_MODEL_DIR")
            .unwrap_or_else(|_| "/workspace/models/jina-embeddings-v2-base-en".to_string()),
    );

    OnnxEmbeddingModel::new(
        MODEL_ID,
        dir.join("model.onnx"),
        dir.join("tokenizer.json"),
        &OnnxModelOptions::default(),
    )
    .expect("Failed to load test model")
}

fn norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_apple_banana_dimensions() {
    let model = load_test_model();
    let texts = vec!["apple".to_string(), "banana".to_string()];

    let embeddings = model.encode(&texts, true).await.unwrap();

    assert_eq!(embeddings.len(), 2);
    assert_eq!(embeddings[0].len(), model.dimension());
    assert_eq!(embeddings[1].len(), model.dimension());
    assert_eq!(model.model_id(), MODEL_ID);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_normalized_and_deterministic() {
    let model = load_test_model();
    let texts = vec![
        "grilled chicken sandwich".to_string(),
        "grilled chicken sandwich".to_string(),
    ];

    let embeddings = model.encode(&texts, true).await.unwrap();

    assert_eq!(embeddings[0], embeddings[1]);
    assert!((norm(&embeddings[0]) - 1.0).abs() < 1e-4);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_padding_does_not_change_vectors() {
    let model = load_test_model();
    let short = "tea".to_string();
    let long = "a very long description of a dish with many ingredients and steps".to_string();

    let alone = model.encode(&[short.clone()], true).await.unwrap();
    let batched = model.encode(&[short, long], true).await.unwrap();

    // Padding inside a batch must not move the short text's vector
    assert!(cosine(&alone[0], &batched[0]) > 0.999);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_semantic_similarity_ordering() {
    let model = load_test_model();
    let texts = vec![
        "cheeseburger with fries".to_string(),
        "hamburger and chips".to_string(),
        "quarterly tax filing deadline".to_string(),
    ];

    let e = model.encode(&texts, true).await.unwrap();

    assert!(cosine(&e[0], &e[1]) > cosine(&e[0], &e[2]));
}
