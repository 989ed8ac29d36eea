// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Server configuration
//!
//! Every setting has a built-in default and can be overridden by a CLI flag
//! or an environment variable (a `.env` file is read at startup).

use crate::embeddings::OnnxModelOptions;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "jinaai/jina-embeddings-v2-base-en";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Sentence embedding HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "embedding-server")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Serves sentence embeddings over POST /encode", long_about = None)]
pub struct ServerConfig {
    /// Model identifier, reported in every response
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Address or hostname to bind
    #[arg(long, env = "EMBEDDING_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "EMBEDDING_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Load model files from this directory instead of the model hub
    #[arg(long, env = "EMBEDDING_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Path of the ONNX graph inside the model directory or hub repository
    #[arg(long, env = "EMBEDDING_ONNX_FILE", default_value = "onnx/model.onnx")]
    pub onnx_file: String,

    /// Maximum tokens per input; longer inputs are truncated
    #[arg(long, env = "EMBEDDING_MAX_LENGTH", default_value_t = 512)]
    pub max_length: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "EMBEDDING_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Serve deterministic hash-derived vectors instead of loading a model
    #[arg(long, env = "EMBEDDING_HASHED")]
    pub hashed_embedder: bool,

    /// Vector length used with --hashed-embedder
    #[arg(long, env = "EMBEDDING_HASHED_DIMENSION", default_value_t = 768)]
    pub hashed_dimension: usize,
}

impl ServerConfig {
    pub fn model_options(&self) -> OnnxModelOptions {
        OnnxModelOptions {
            max_length: self.max_length,
            intra_threads: self.intra_threads,
        }
    }
}
