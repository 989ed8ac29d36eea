// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the embedding server

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-encode-endpoint-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "encode-endpoint",
    "health-endpoint",
    "onnx-runtime",
    "cuda-fallback-cpu",
    "hub-model-resolution",
    "normalized-embeddings",
    "degraded-startup",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Embedding Server {} ({})", VERSION_NUMBER, BUILD_DATE)
}
