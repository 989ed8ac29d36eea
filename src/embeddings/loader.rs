// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model loading
//!
//! Resolves the configured model identifier to an ONNX graph and tokenizer,
//! either from a local directory or from the Hugging Face hub, and builds the
//! process-wide [`SharedEmbedder`] exactly once at startup.
//!
//! A failed load does not abort the process. The handle is left unset and
//! the encode endpoint reports the model as unavailable.

use crate::config::ServerConfig;
use crate::embeddings::{Embedder, HashedEmbedder, OnnxEmbeddingModel, SharedEmbedder};
use anyhow::{Context, Result};
use hf_hub::api::sync::Api;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where the model files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Files already on disk under `dir`
    Local { dir: PathBuf, onnx_file: String },
    /// Files downloaded (and cached) from a hub repository
    Hub { repo: String, onnx_file: String },
}

impl ModelSource {
    pub fn from_config(config: &ServerConfig) -> Self {
        match &config.model_dir {
            Some(dir) => ModelSource::Local {
                dir: dir.clone(),
                onnx_file: config.onnx_file.clone(),
            },
            None => ModelSource::Hub {
                repo: config.model.clone(),
                onnx_file: config.onnx_file.clone(),
            },
        }
    }

    /// Returns `(model_path, tokenizer_path)`, downloading when needed.
    ///
    /// Blocks on network I/O for hub sources.
    pub fn fetch(&self) -> Result<(PathBuf, PathBuf)> {
        match self {
            ModelSource::Local { dir, onnx_file } => {
                Ok((dir.join(onnx_file), dir.join(TOKENIZER_FILE)))
            }
            ModelSource::Hub { repo, onnx_file } => {
                info!("Resolving {} from the model hub", repo);
                let api = Api::new().context("Failed to create model hub client")?;
                let hub_repo = api.model(repo.clone());
                let model_path = hub_repo
                    .get(onnx_file)
                    .with_context(|| format!("Failed to fetch {} from {}", onnx_file, repo))?;
                let tokenizer_path = hub_repo
                    .get(TOKENIZER_FILE)
                    .with_context(|| format!("Failed to fetch {} from {}", TOKENIZER_FILE, repo))?;
                Ok((model_path, tokenizer_path))
            }
        }
    }
}

/// Resolves and loads the configured ONNX model. Blocking.
pub fn load_model(config: &ServerConfig) -> Result<OnnxEmbeddingModel> {
    let source = ModelSource::from_config(config);
    let (model_path, tokenizer_path) = source.fetch()?;
    load_from_paths(&config.model, &model_path, &tokenizer_path, config)
}

fn load_from_paths(
    model_id: &str,
    model_path: &Path,
    tokenizer_path: &Path,
    config: &ServerConfig,
) -> Result<OnnxEmbeddingModel> {
    OnnxEmbeddingModel::new(
        model_id,
        model_path,
        tokenizer_path,
        &config.model_options(),
    )
    .with_context(|| format!("Failed to load model {}", model_id))
}

/// Builds the process-wide model handle.
///
/// Returns `None` when loading fails, after logging the cause.
pub async fn load_or_unavailable(config: &ServerConfig) -> SharedEmbedder {
    if config.hashed_embedder {
        return match HashedEmbedder::new(config.model.clone(), config.hashed_dimension) {
            Ok(embedder) => {
                info!(
                    "Serving hashed embeddings as {} ({} dimensions)",
                    config.model, config.hashed_dimension
                );
                Some(Arc::new(embedder) as Arc<dyn Embedder>)
            }
            Err(e) => {
                error!("Error loading model {}: {:#}", config.model, e);
                None
            }
        };
    }

    let owned = config.clone();
    let result = tokio::task::spawn_blocking(move || load_model(&owned))
        .await
        .context("Model loading task panicked")
        .and_then(|r| r);

    match result {
        Ok(model) => {
            info!(
                "Successfully loaded model: {} ({} dimensions)",
                model.model_id(),
                model.dimension()
            );
            Some(Arc::new(model) as Arc<dyn Embedder>)
        }
        Err(e) => {
            error!("Error loading model {}: {:#}", config.model, e);
            None
        }
    }
}
