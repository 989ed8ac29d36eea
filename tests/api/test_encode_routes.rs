// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route tests for POST /encode and GET /health
//!
//! These tests drive the full router with a deterministic hashed model and
//! verify:
//! - One vector per input, in input order
//! - Fixed dimension and unit length for every vector
//! - Empty batches succeed
//! - Repeated strings encode identically
//! - Batches larger than axum's default 2 MB body limit are accepted
//! - Method and route registration

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use embedding_server::{
    api::{create_app, AppState, EncodeResponse, HealthResponse},
    embeddings::HashedEmbedder,
};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const MODEL_ID: &str = "jinaai/jina-embeddings-v2-base-en";
const DIMENSION: usize = 768;

/// Helper: AppState with a loaded (hashed) model
fn setup_state_with_model() -> AppState {
    let embedder = HashedEmbedder::new(MODEL_ID, DIMENSION).expect("valid dimension");
    AppState::with_embedder(Arc::new(embedder))
}

fn encode_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/encode")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod encode_route_tests {
    use super::*;

    /// The reference scenario: two fruits in, two vectors out
    #[tokio::test]
    async fn test_apple_banana() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(encode_request(r#"{"texts": ["apple", "banana"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: EncodeResponse = read_json(response).await;
        assert_eq!(body.embeddings.len(), 2);
        assert_eq!(body.model, MODEL_ID);
        for vector in &body.embeddings {
            assert_eq!(vector.len(), DIMENSION);
        }
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(encode_request(
                r#"{"texts": ["menu item name", "spicy noodles", "a"]}"#,
            ))
            .await
            .unwrap();

        let body: EncodeResponse = read_json(response).await;
        for (i, vector) in body.embeddings.iter().enumerate() {
            assert!(
                (norm(vector) - 1.0).abs() < 1e-4,
                "embedding {} has norm {}",
                i,
                norm(vector)
            );
        }
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let state = setup_state_with_model();

        let forward: EncodeResponse = read_json(
            create_app(state.clone())
                .oneshot(encode_request(r#"{"texts": ["first", "second", "third"]}"#))
                .await
                .unwrap(),
        )
        .await;

        let reversed: EncodeResponse = read_json(
            create_app(state)
                .oneshot(encode_request(r#"{"texts": ["third", "second", "first"]}"#))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(forward.embeddings[0], reversed.embeddings[2]);
        assert_eq!(forward.embeddings[1], reversed.embeddings[1]);
        assert_eq!(forward.embeddings[2], reversed.embeddings[0]);
    }

    #[tokio::test]
    async fn test_duplicate_texts_identical() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(encode_request(r#"{"texts": ["apple", "apple"]}"#))
            .await
            .unwrap();

        let body: EncodeResponse = read_json(response).await;
        assert_eq!(body.embeddings.len(), 2);
        assert_eq!(body.embeddings[0], body.embeddings[1]);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_embeddings() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(encode_request(r#"{"texts": []}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: EncodeResponse = read_json(response).await;
        assert!(body.embeddings.is_empty());
        assert_eq!(body.model, MODEL_ID);
    }

    #[tokio::test]
    async fn test_large_batch_accepted() {
        // 16 dimensions keeps the response small; the request is what matters
        let embedder = HashedEmbedder::new(MODEL_ID, 16).expect("valid dimension");
        let app = create_app(AppState::with_embedder(Arc::new(embedder)));

        let texts: Vec<String> = (0..60_000)
            .map(|i| format!("menu item number {:0>30}", i))
            .collect();
        let body = serde_json::to_string(&serde_json::json!({ "texts": texts })).unwrap();
        assert!(body.len() > 2 * 1024 * 1024);

        let response = app.oneshot(encode_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: EncodeResponse = read_json(response).await;
        assert_eq!(body.embeddings.len(), 60_000);
    }

    #[tokio::test]
    async fn test_encode_rejects_get() {
        let app = create_app(setup_state_with_model());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/encode")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_route_not_found() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/v1/embed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_reports_loaded_model() {
        let app = create_app(setup_state_with_model());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = read_json(response).await;
        assert_eq!(health.status, "ok");
        assert!(health.model_loaded);
        assert_eq!(health.dimension, Some(DIMENSION));
        assert_eq!(health.model, MODEL_ID);
    }
}
