// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /encode HTTP handler

use crate::api::encode::{EncodeRequest, EncodeResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::time::Instant;
use tracing::{debug, error, warn};

/// POST /encode handler
///
/// Forwards the whole batch to the shared model with normalization enabled.
/// The request succeeds or fails as one unit.
///
/// # Errors
/// - 503 when the model failed to load at startup
/// - 500 when inference fails
/// - 400 / 415 when the body is not a JSON `{"texts": [...]}` object
/// - 413 when a body limit is layered on the route and exceeded
pub async fn encode_handler(
    State(state): State<AppState>,
    payload: Result<Json<EncodeRequest>, JsonRejection>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected encode request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let embedder = state.embedder.as_ref().ok_or_else(|| {
        warn!("Encode request while model {} is unavailable", state.model_id);
        ApiError::model_unavailable()
    })?;

    let started = Instant::now();
    let embeddings = embedder.encode(&request.texts, true).await.map_err(|e| {
        error!("Embedding generation failed: {:#}", e);
        ApiError::InternalError(format!("Embedding generation failed: {}", e))
    })?;

    if embeddings.len() != request.texts.len() {
        error!(
            "Model returned {} vectors for {} texts",
            embeddings.len(),
            request.texts.len()
        );
        return Err(ApiError::InternalError(
            "Model returned a mismatched number of embeddings".to_string(),
        ));
    }

    debug!(
        "Encoded {} texts in {} ms",
        request.texts.len(),
        started.elapsed().as_millis()
    );

    Ok(Json(EncodeResponse {
        embeddings,
        model: embedder.model_id().to_string(),
    }))
}
