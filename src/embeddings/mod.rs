// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding engines
//!
//! The HTTP layer only sees the [`Embedder`] trait. Two engines implement it:
//! - [`OnnxEmbeddingModel`]: a pretrained transformer run through ONNX Runtime
//! - [`HashedEmbedder`]: deterministic hash-derived vectors, no model files
//!
//! [`loader`] resolves a model identifier to files and builds the process-wide
//! [`SharedEmbedder`] once at startup.

pub mod hashed;
pub mod loader;
pub mod onnx_model;
pub mod pooling;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use hashed::HashedEmbedder;
pub use loader::{load_model, load_or_unavailable, ModelSource};
pub use onnx_model::{OnnxEmbeddingModel, OnnxModelOptions};

/// A model that turns a batch of strings into fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier reported back to clients in every response
    fn model_id(&self) -> &str;

    /// Length of every vector this model produces
    fn dimension(&self) -> usize;

    /// Encodes `texts` in order. The output has exactly one vector per input.
    ///
    /// With `normalize` set, every non-zero vector is scaled to unit L2 length.
    async fn encode(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>>;
}

/// Process-wide model handle. `None` means the model failed to load.
pub type SharedEmbedder = Option<Arc<dyn Embedder>>;
