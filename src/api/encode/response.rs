// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EncodeResponse type for POST /encode

use serde::{Deserialize, Serialize};

/// Response body for POST /encode
///
/// # Example
/// ```json
/// {
///   "embeddings": [[0.012, -0.044, ...], [0.031, 0.007, ...]],
///   "model": "jinaai/jina-embeddings-v2-base-en"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodeResponse {
    /// One vector per input string, in request order
    pub embeddings: Vec<Vec<f32>>,

    /// Identifier of the model that produced the vectors
    pub model: String,
}

impl EncodeResponse {
    /// Length shared by every vector, or `None` for an empty batch
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }
}
