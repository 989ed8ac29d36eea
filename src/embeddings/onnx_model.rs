// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence transformer exported to ONNX through ONNX Runtime.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenization with truncation and per-batch padding
//! - Mean pooling over token embeddings, optional L2 normalization
//! - Output dimension discovered from the model at load time

use super::pooling::{l2_normalize, mean_pool};
use super::Embedder;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis, Ix2};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Tuning knobs for session construction and tokenization
#[derive(Debug, Clone)]
pub struct OnnxModelOptions {
    /// Inputs longer than this many tokens are truncated
    pub max_length: usize,
    /// Threads ONNX Runtime may use inside a single operator
    pub intra_threads: usize,
}

impl Default for OnnxModelOptions {
    fn default() -> Self {
        Self {
            max_length: 512,
            intra_threads: 4,
        }
    }
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// All fields are wrapped in Arc for cheap cloning. ONNX Runtime needs
/// exclusive access to the session for each run, so it sits behind a mutex.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,

    tokenizer: Arc<Tokenizer>,

    /// Model identifier (e.g., "jinaai/jina-embeddings-v2-base-en")
    model_id: String,

    /// Hidden size reported by the validation run
    dimension: usize,

    /// Whether the graph declares a `token_type_ids` input
    uses_token_type_ids: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .field("uses_token_type_ids", &self.uses_token_type_ids)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// This call blocks while the session is built and a validation inference
    /// runs; call it from a blocking context.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The model output is not `[batch, seq_len, hidden]` or `[batch, hidden]`
    pub fn new<P: AsRef<Path>>(
        model_id: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        options: &OnnxModelOptions,
    ) -> Result<Self> {
        let model_id = model_id.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        info!("Initializing ONNX embedding model {}", model_id);

        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(options.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path);

        let mut session = match cuda_result {
            Ok(s) => {
                info!("CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("CUDA execution provider failed: {}", e);
                warn!("Falling back to CPU execution provider");
                Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(options.intra_threads)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .context(format!(
                        "Failed to load ONNX model from {}",
                        model_path.display()
                    ))?
            }
        };

        let uses_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        // Discover the hidden size with a one-item batch
        let sample = tokenizer
            .encode("validation test", true)
            .map_err(|e| anyhow!("Tokenizer validation failed: {}", e))?;
        let sample_output = forward(&mut session, uses_token_type_ids, &[sample])
            .context("Validation inference failed")?;
        let dimension = sample_output
            .first()
            .map(Vec::len)
            .filter(|&d| d > 0)
            .context("Model produced an empty embedding during validation")?;

        info!(
            "ONNX embedding model loaded: {} ({} dimensions, token_type_ids: {})",
            model_id, dimension, uses_token_type_ids
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_id,
            dimension,
            uses_token_type_ids,
        })
    }

    /// Generates embeddings for a batch of texts, blocking the calling thread
    ///
    /// Tokenizes all texts, pads to the longest sequence and runs a single
    /// inference over the whole batch.
    pub fn encode_blocking(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings: Vec<Encoding> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut embeddings = {
            let mut session_guard = self
                .session
                .lock()
                .map_err(|e| anyhow!("ONNX session lock poisoned: {}", e))?;
            forward(&mut session_guard, self.uses_token_type_ids, &encodings)?
        };

        for (i, emb) in embeddings.iter_mut().enumerate() {
            if emb.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    emb.len(),
                    self.dimension
                );
            }
            if normalize {
                l2_normalize(emb);
            }
        }

        debug!("Encoded batch of {} texts", texts.len());
        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for OnnxEmbeddingModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        let model = self.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.encode_blocking(&texts, normalize))
            .await
            .context("Embedding task panicked")?
    }
}

/// Token ids and attention masks padded to the longest sequence, row-major
#[derive(Debug, Clone, PartialEq)]
struct PaddedBatch {
    batch: usize,
    max_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
}

impl PaddedBatch {
    fn mask_row(&self, index: usize) -> &[i64] {
        let start = index * self.max_len;
        &self.attention_mask[start..start + self.max_len]
    }
}

/// Pads `(ids, attention_mask)` rows with zeros to a common length.
fn pad_batch(rows: &[(&[u32], &[u32])]) -> PaddedBatch {
    let batch = rows.len();
    let max_len = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);

    let mut input_ids = Vec::with_capacity(batch * max_len);
    let mut attention_mask = Vec::with_capacity(batch * max_len);

    for (ids, mask) in rows {
        input_ids.extend(ids.iter().map(|&id| id as i64));
        attention_mask.extend(mask.iter().map(|&m| m as i64));

        let padding_needed = max_len - ids.len();
        input_ids.extend(std::iter::repeat(0i64).take(padding_needed));
        attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
    }

    PaddedBatch {
        batch,
        max_len,
        input_ids,
        attention_mask,
    }
}

/// Turns the first model output into one vector per batch item.
///
/// Token-level outputs `[batch, seq_len, hidden]` are mean pooled with the
/// batch's attention mask; `[batch, hidden]` outputs are taken as is.
fn pool_output(output: ArrayViewD<'_, f32>, padded: &PaddedBatch) -> Result<Vec<Vec<f32>>> {
    let batch = padded.batch;
    let shape = output.shape().to_vec();

    let mut embeddings = Vec::with_capacity(batch);
    match shape.as_slice() {
        [b, s, _] if *b == batch && *s == padded.max_len => {
            for batch_idx in 0..batch {
                let item = output
                    .index_axis(Axis(0), batch_idx)
                    .into_dimensionality::<Ix2>()
                    .context("Unexpected token embedding shape")?;
                embeddings.push(mean_pool(item, padded.mask_row(batch_idx)));
            }
        }
        [b, _] if *b == batch => {
            for batch_idx in 0..batch {
                let item = output.index_axis(Axis(0), batch_idx);
                embeddings.push(item.iter().copied().collect());
            }
        }
        _ => anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [{}, {}, hidden] or [{}, hidden])",
            shape,
            batch,
            padded.max_len,
            batch
        ),
    }

    Ok(embeddings)
}

/// Runs one padded batch through the session and pools the output.
fn forward(
    session: &mut Session,
    uses_token_type_ids: bool,
    encodings: &[Encoding],
) -> Result<Vec<Vec<f32>>> {
    let rows: Vec<(&[u32], &[u32])> = encodings
        .iter()
        .map(|enc| (enc.get_ids(), enc.get_attention_mask()))
        .collect();
    let mut padded = pad_batch(&rows);
    let (batch, max_len) = (padded.batch, padded.max_len);

    let input_ids = std::mem::take(&mut padded.input_ids);
    let input_ids_array = Array2::from_shape_vec((batch, max_len), input_ids)
        .context("Failed to create batch input_ids array")?;
    let attention_mask_array =
        Array2::from_shape_vec((batch, max_len), padded.attention_mask.clone())
            .context("Failed to create batch attention_mask array")?;

    let outputs = if uses_token_type_ids {
        let token_type_ids_array = Array2::<i64>::zeros((batch, max_len));
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?
        ])?
    };

    // Output names differ between exports; the first output is the hidden state
    let output_array = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    pool_output(output_array, &padded)
}
