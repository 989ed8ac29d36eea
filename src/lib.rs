// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod client;
pub mod config;
pub mod embeddings;
pub mod version;

pub use api::{create_app, AppState, EncodeRequest, EncodeResponse};
pub use client::EncodeClient;
pub use config::ServerConfig;
pub use embeddings::{Embedder, HashedEmbedder, OnnxEmbeddingModel, SharedEmbedder};
