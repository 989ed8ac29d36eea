// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::http_server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    /// "ok" when the model is loaded, "degraded" otherwise
    pub status: String,
    pub model: String,
    pub model_loaded: bool,
    pub dimension: Option<usize>,
    pub version: String,
}

impl HealthResponse {
    pub fn from_state(state: &AppState) -> Self {
        let dimension = state.embedder.as_ref().map(|e| e.dimension());
        let model_loaded = dimension.is_some();

        HealthResponse {
            status: if model_loaded { "ok" } else { "degraded" }.to_string(),
            model: state.model_id.clone(),
            model_loaded,
            dimension,
            version: crate::version::VERSION.to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}
