// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{encode_handler, health_handler};
use crate::config::ServerConfig;
use crate::embeddings::{Embedder, SharedEmbedder};

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    /// Configured model identifier, known even when loading failed
    pub model_id: String,
    /// Loaded model, or `None` when startup loading failed
    pub embedder: SharedEmbedder,
}

impl AppState {
    pub fn new(model_id: impl Into<String>, embedder: SharedEmbedder) -> Self {
        Self {
            model_id: model_id.into(),
            embedder,
        }
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            model_id: embedder.model_id().to_string(),
            embedder: Some(embedder),
        }
    }
}

/// Builds the router. Request bodies are not size limited: a batch of any
/// length is accepted.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/encode", post(encode_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server terminated with an error")
}

/// Binds the configured host and port. Hostnames such as `localhost` are
/// resolved.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))
}

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = bind_listener(config).await?;
    let addr = listener
        .local_addr()
        .context("Failed to read bound address")?;

    tracing::info!("Starting server on http://{}", addr);

    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
